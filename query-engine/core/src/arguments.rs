use crate::{ArgumentValue, CoreError, CoreResult, QueryRequest, Selection};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use content_metadata::{AttributeType, FilterClause, FilterDefinition, OrderByToken, RelayPaginationArgs};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use schema::{EnumType, FilterMap};
use sql_connection::Value;

/// Extract the Relay pagination arguments off a connection field.
pub(crate) fn pagination(request: &QueryRequest, selection: &Selection) -> CoreResult<RelayPaginationArgs> {
    Ok(RelayPaginationArgs {
        skip: int_argument(request, selection, "skip")?,
        first: int_argument(request, selection, "first")?,
        after: string_argument(request, selection, "after")?,
        before: string_argument(request, selection, "before")?,
        last: int_argument(request, selection, "last")?,
    })
}

/// Resolve the `order` argument against the content type's order enum.
pub(crate) fn order_by(
    request: &QueryRequest,
    selection: &Selection,
    order_enum: Option<&EnumType>,
) -> CoreResult<Vec<OrderByToken>> {
    let Some(argument) = selection.find_argument("order") else {
        return Ok(Vec::new());
    };

    let argument = request.resolve(argument)?;

    let Some(order_enum) = order_enum else {
        return Err(CoreError::argument(format!(
            "Field {} does not accept an order argument",
            selection.name
        )));
    };

    let values = match argument {
        ArgumentValue::List(values) => values.clone(),
        ArgumentValue::Null => return Ok(Vec::new()),
        single => vec![single.clone()],
    };

    let mut tokens = Vec::with_capacity(values.len());

    for value in &values {
        let value = request.resolve(value)?;
        let name = match value {
            ArgumentValue::Enum(name) | ArgumentValue::String(name) => name,
            other => {
                return Err(CoreError::argument(format!(
                    "Invalid order value {other:?}"
                )))
            }
        };

        let token = order_enum
            .value(name)
            .map(|v| v.token.clone())
            .ok_or_else(|| {
                CoreError::argument(format!(
                    "Unknown order value {name} for {}",
                    order_enum.identifier.name()
                ))
            })?;

        tokens.push(token);
    }

    Ok(tokens)
}

/// Resolve the `filter` argument against the content type's filter side
/// table, producing compiled-ready clauses.
pub(crate) fn filters(
    request: &QueryRequest,
    selection: &Selection,
    filter_map: Option<&FilterMap>,
) -> CoreResult<Vec<FilterClause>> {
    let Some(argument) = selection.find_argument("filter") else {
        return Ok(Vec::new());
    };

    let argument = request.resolve(argument)?;

    let fields = match argument {
        ArgumentValue::Object(fields) => fields,
        ArgumentValue::Null => return Ok(Vec::new()),
        other => {
            return Err(CoreError::argument(format!(
                "Invalid filter argument {other:?}"
            )))
        }
    };

    let Some(filter_map) = filter_map else {
        return Err(CoreError::argument(format!(
            "Field {} does not accept a filter argument",
            selection.name
        )));
    };

    let mut clauses = Vec::with_capacity(fields.len());

    for (field_name, value) in fields {
        let definition = filter_map.get(field_name).ok_or_else(|| {
            CoreError::argument(format!("Unknown filter field {field_name}"))
        })?;

        let value = request.resolve(value)?;

        clauses.push(FilterClause {
            definition: definition.clone(),
            value: filter_value(definition, value)?,
        });
    }

    Ok(clauses)
}

/// Convert a caller value to the typed SQL value the clause binds. The
/// declared attribute type decides the conversion.
fn filter_value(definition: &FilterDefinition, value: &ArgumentValue) -> CoreResult<Value> {
    let field_type = match definition {
        FilterDefinition::Field { field_type, .. } => *field_type,
        // Relation membership filters always carry id lists.
        FilterDefinition::ManyToMany { .. } => return id_list_value(value),
    };

    if value.is_null() {
        return Ok(null_of(field_type));
    }

    if let ArgumentValue::List(_) = value {
        return id_list_value(value);
    }

    let converted = match field_type {
        AttributeType::Numeric => match value {
            ArgumentValue::Int(i) => Value::integer(*i),
            ArgumentValue::Float(f) => Value::Real(Decimal::from_f64(*f)),
            other => return Err(invalid_value("a number", other)),
        },
        AttributeType::Boolean => match value {
            ArgumentValue::Boolean(b) => Value::boolean(*b),
            ArgumentValue::Int(i) => Value::boolean(*i == 1),
            other => return Err(invalid_value("a boolean", other)),
        },
        AttributeType::Date => Value::date(parse_date(string_of(value)?)?),
        AttributeType::Time => Value::time(parse_time(string_of(value)?)?),
        AttributeType::DateTime => Value::datetime(parse_datetime(string_of(value)?)?),
        AttributeType::Relation => match value {
            ArgumentValue::Int(i) => Value::integer(*i),
            other => return Err(invalid_value("an id", other)),
        },
        _ => Value::text(string_of(value)?),
    };

    Ok(converted)
}

fn id_list_value(value: &ArgumentValue) -> CoreResult<Value> {
    match value {
        ArgumentValue::List(values) => {
            let mut ids = Vec::with_capacity(values.len());

            for value in values {
                match value {
                    ArgumentValue::Int(i) => ids.push(*i),
                    other => return Err(invalid_value("an id", other)),
                }
            }

            Ok(Value::id_array(ids))
        }
        ArgumentValue::Int(i) => Ok(Value::id_array([*i])),
        ArgumentValue::Null => Ok(Value::Array(None)),
        other => Err(invalid_value("an id list", other)),
    }
}

fn null_of(field_type: AttributeType) -> Value {
    match field_type {
        AttributeType::Numeric | AttributeType::Relation => Value::Integer(None),
        AttributeType::Boolean => Value::Boolean(None),
        AttributeType::Date => Value::Date(None),
        AttributeType::Time => Value::Time(None),
        AttributeType::DateTime => Value::DateTime(None),
        _ => Value::Text(None),
    }
}

fn parse_date(input: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| CoreError::argument(format!("Invalid date value {input}")))
}

fn parse_time(input: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| CoreError::argument(format!("Invalid time value {input}")))
}

fn parse_datetime(input: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        })
        .map_err(|_| CoreError::argument(format!("Invalid datetime value {input}")))
}

fn string_of(value: &ArgumentValue) -> CoreResult<&str> {
    match value {
        ArgumentValue::String(s) | ArgumentValue::Enum(s) => Ok(s),
        other => Err(invalid_value("a string", other)),
    }
}

fn invalid_value(expected: &str, value: &ArgumentValue) -> CoreError {
    CoreError::argument(format!("Expected {expected}, got {value:?}"))
}

pub(crate) fn int_argument(
    request: &QueryRequest,
    selection: &Selection,
    name: &str,
) -> CoreResult<Option<i64>> {
    match selection.find_argument(name) {
        None => Ok(None),
        Some(value) => match request.resolve(value)? {
            ArgumentValue::Int(i) => Ok(Some(*i)),
            ArgumentValue::Null => Ok(None),
            other => Err(CoreError::argument(format!(
                "Argument {name} must be an integer, got {other:?}"
            ))),
        },
    }
}

fn string_argument(
    request: &QueryRequest,
    selection: &Selection,
    name: &str,
) -> CoreResult<Option<String>> {
    match selection.find_argument(name) {
        None => Ok(None),
        Some(value) => match request.resolve(value)? {
            ArgumentValue::String(s) => Ok(Some(s.clone())),
            ArgumentValue::Int(i) => Ok(Some(i.to_string())),
            ArgumentValue::Null => Ok(None),
            other => Err(CoreError::argument(format!(
                "Argument {name} must be a string, got {other:?}"
            ))),
        },
    }
}
