use crate::{Queryable, ResultSet, Value};
use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use tokio_postgres::{
    types::{to_sql_checked, IsNull, ToSql, Type as PostgresType},
    Client, NoTls, Row as PostgresRow,
};

/// A connection to a PostgreSQL database.
pub struct PostgreSql {
    client: Client,
}

impl PostgreSql {
    /// Open a single connection from a libpq-style connection string. The
    /// connection task is spawned onto the current runtime.
    pub async fn connect(conn_str: &str) -> crate::Result<Self> {
        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| crate::Error::ConnectionError(Box::new(e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(message = "postgres connection closed", error = %e);
            }
        });

        Ok(PostgreSql { client })
    }
}

#[async_trait]
impl Queryable for PostgreSql {
    async fn query_raw(&self, sql: &str, params: &[Value]) -> crate::Result<ResultSet> {
        let stmt = self.client.prepare(sql).await?;
        let rows = self.client.query(&stmt, conv_params(params).as_slice()).await?;

        let columns = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let mut converted = Vec::with_capacity(rows.len());

        for row in rows {
            converted.push(get_result_row(&row)?);
        }

        Ok(ResultSet::new(columns, converted))
    }

    async fn execute_raw(&self, sql: &str, params: &[Value]) -> crate::Result<u64> {
        let stmt = self.client.prepare(sql).await?;
        let changes = self.client.execute(&stmt, conv_params(params).as_slice()).await?;

        Ok(changes)
    }
}

fn conv_params<'a>(params: &'a [Value]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|x| x as &(dyn ToSql + Sync)).collect()
}

fn get_result_row(row: &PostgresRow) -> crate::Result<Vec<Value>> {
    let mut values = Vec::with_capacity(row.columns().len());

    for (i, column) in row.columns().iter().enumerate() {
        let ty = column.type_();

        let value = if *ty == PostgresType::BOOL {
            Value::Boolean(row.try_get(i)?)
        } else if *ty == PostgresType::INT2 {
            let val: Option<i16> = row.try_get(i)?;
            Value::Integer(val.map(i64::from))
        } else if *ty == PostgresType::INT4 {
            let val: Option<i32> = row.try_get(i)?;
            Value::Integer(val.map(i64::from))
        } else if *ty == PostgresType::INT8 {
            Value::Integer(row.try_get(i)?)
        } else if *ty == PostgresType::NUMERIC {
            Value::Real(row.try_get(i)?)
        } else if *ty == PostgresType::FLOAT4 {
            let val: Option<f32> = row.try_get(i)?;
            match val {
                Some(f) => Value::Real(Some(Decimal::from_f32(f).ok_or_else(|| {
                    crate::Error::conversion(column.name(), "f32 is not a decimal")
                })?)),
                None => Value::Real(None),
            }
        } else if *ty == PostgresType::FLOAT8 {
            let val: Option<f64> = row.try_get(i)?;
            match val {
                Some(f) => Value::Real(Some(Decimal::from_f64(f).ok_or_else(|| {
                    crate::Error::conversion(column.name(), "f64 is not a decimal")
                })?)),
                None => Value::Real(None),
            }
        } else if *ty == PostgresType::TEXT
            || *ty == PostgresType::VARCHAR
            || *ty == PostgresType::BPCHAR
            || *ty == PostgresType::NAME
        {
            Value::Text(row.try_get(i)?)
        } else if *ty == PostgresType::DATE {
            Value::Date(row.try_get(i)?)
        } else if *ty == PostgresType::TIME {
            Value::Time(row.try_get(i)?)
        } else if *ty == PostgresType::TIMESTAMP {
            let val: Option<NaiveDateTime> = row.try_get(i)?;
            Value::DateTime(val.map(|dt| Utc.from_utc_datetime(&dt)))
        } else if *ty == PostgresType::TIMESTAMPTZ {
            Value::DateTime(row.try_get(i)?)
        } else {
            return Err(crate::Error::conversion(
                column.name(),
                format!("unsupported column type {ty}"),
            ));
        };

        values.push(value);
    }

    Ok(values)
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &PostgresType,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Integer(i) => i.to_sql(ty, out),
            Value::Real(d) => d.to_sql(ty, out),
            Value::Boolean(b) => b.to_sql(ty, out),
            Value::Text(t) => t.to_sql(ty, out),
            Value::Date(d) => <Option<NaiveDate> as ToSql>::to_sql(d, ty, out),
            Value::Time(t) => <Option<NaiveTime> as ToSql>::to_sql(t, ty, out),
            // Bound against `timestamp` columns, so shed the timezone.
            Value::DateTime(dt) => dt.map(|dt: DateTime<Utc>| dt.naive_utc()).to_sql(ty, out),
            Value::Array(values) => {
                let ids: Option<Vec<i64>> = values
                    .as_ref()
                    .map(|vs| vs.iter().filter_map(|v| v.as_i64()).collect());

                ids.to_sql(ty, out)
            }
        }
    }

    fn accepts(_ty: &PostgresType) -> bool {
        true
    }

    to_sql_checked!();
}
