use crate::{Queryable, ResultSet, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tiberius::{Client, ColumnData, Config, FromSql, ToSql};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// A connection to a SQL Server database.
///
/// The tiberius client takes `&mut self` on every call, so the connection
/// sits behind a mutex.
pub struct Mssql {
    client: Mutex<Client<Compat<TcpStream>>>,
}

impl Mssql {
    /// Open a single connection from an ADO.NET-style connection string.
    pub async fn connect(conn_str: &str) -> crate::Result<Self> {
        let config = Config::from_ado_string(conn_str)
            .map_err(|e| crate::Error::ConnectionError(Box::new(e)))?;

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| crate::Error::ConnectionError(Box::new(e)))?;

        tcp.set_nodelay(true)
            .map_err(|e| crate::Error::ConnectionError(Box::new(e)))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| crate::Error::ConnectionError(Box::new(e)))?;

        Ok(Mssql {
            client: Mutex::new(client),
        })
    }
}

#[async_trait]
impl Queryable for Mssql {
    async fn query_raw(&self, sql: &str, params: &[Value]) -> crate::Result<ResultSet> {
        let mut client = self.client.lock().await;
        let converted = conv_params(params);

        let stream = client.query(sql, converted.as_slice()).await?;
        let rows = stream.into_first_result().await?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut converted_rows = Vec::with_capacity(rows.len());

        for row in rows {
            let mut values = Vec::with_capacity(row.len());

            for (i, data) in row.into_iter().enumerate() {
                values.push(column_data_to_value(i, data)?);
            }

            converted_rows.push(values);
        }

        Ok(ResultSet::new(columns, converted_rows))
    }

    async fn execute_raw(&self, sql: &str, params: &[Value]) -> crate::Result<u64> {
        let mut client = self.client.lock().await;
        let converted = conv_params(params);

        let result = client.execute(sql, converted.as_slice()).await?;

        Ok(result.total())
    }
}

fn conv_params(params: &[Value]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

fn column_data_to_value(index: usize, data: ColumnData<'static>) -> crate::Result<Value> {
    let value = match data {
        ColumnData::U8(num) => Value::Integer(num.map(i64::from)),
        ColumnData::I16(num) => Value::Integer(num.map(i64::from)),
        ColumnData::I32(num) => Value::Integer(num.map(i64::from)),
        ColumnData::I64(num) => Value::Integer(num),
        ColumnData::F32(num) => Value::Real(num.and_then(rust_decimal::Decimal::from_f32_retain)),
        ColumnData::F64(num) => Value::Real(num.and_then(rust_decimal::Decimal::from_f64_retain)),
        ColumnData::Bit(b) => Value::Boolean(b),
        ColumnData::String(s) => Value::Text(s.map(|s| s.into_owned())),
        numeric @ ColumnData::Numeric(_) => {
            Value::Real(rust_decimal::Decimal::from_sql(&numeric)?)
        }
        dt @ ColumnData::DateTime(_) | dt @ ColumnData::SmallDateTime(_) | dt @ ColumnData::DateTime2(_) => {
            let dt = NaiveDateTime::from_sql(&dt)?.map(|dt| Utc.from_utc_datetime(&dt));
            Value::DateTime(dt)
        }
        dt @ ColumnData::DateTimeOffset(_) => Value::DateTime(DateTime::<Utc>::from_sql(&dt)?),
        date @ ColumnData::Date(_) => Value::Date(NaiveDate::from_sql(&date)?),
        time @ ColumnData::Time(_) => Value::Time(NaiveTime::from_sql(&time)?),
        other => {
            return Err(crate::Error::conversion(
                format!("column {index}"),
                format!("unsupported column data {other:?}"),
            ))
        }
    };

    Ok(value)
}

impl ToSql for Value {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            Value::Integer(val) => val.to_sql(),
            Value::Real(val) => val.to_sql(),
            Value::Boolean(val) => val.to_sql(),
            Value::Text(val) => val.to_sql(),
            Value::Date(val) => val.to_sql(),
            Value::Time(val) => val.to_sql(),
            Value::DateTime(val) => val.to_sql(),
            // The SQL Server dialect expands id sets into row constructors
            // with one scalar parameter per id, so arrays never reach the
            // driver.
            Value::Array(_) => panic!("array parameters are not supported on SQL Server"),
        }
    }
}
