//! The response intermediate representation: a field-order-preserving tree
//! built during resolution and serialized by the transport.

use crate::GraphqlError;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

pub type Map = IndexMap<String, Item>;

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Null,
    Value(JsonValue),
    List(Vec<Item>),
    Map(Map),
}

impl Item {
    pub fn string(value: impl Into<String>) -> Self {
        Item::Value(JsonValue::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Item::Value(JsonValue::Number(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Item::Value(JsonValue::Bool(value))
    }

    pub fn float(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(|n| Item::Value(JsonValue::Number(n)))
            .unwrap_or(Item::Null)
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            Item::Null => JsonValue::Null,
            Item::Value(value) => value,
            Item::List(items) => JsonValue::Array(items.into_iter().map(Item::into_json).collect()),
            Item::Map(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(key, item)| (key, item.into_json()))
                    .collect(),
            ),
        }
    }
}

/// The outcome of one request: the data tree and any error entries.
#[derive(Debug, Default)]
pub struct Response {
    pub data: Option<Map>,
    pub errors: Vec<GraphqlError>,
}

impl Response {
    pub fn from_error(error: GraphqlError) -> Self {
        Response {
            data: None,
            errors: vec![error],
        }
    }

    pub fn into_json(self) -> JsonValue {
        let mut body = serde_json::Map::new();

        body.insert(
            "data".to_string(),
            match self.data {
                Some(map) => Item::Map(map).into_json(),
                None => JsonValue::Null,
            },
        );

        if !self.errors.is_empty() {
            body.insert(
                "errors".to_string(),
                serde_json::to_value(&self.errors).unwrap_or(JsonValue::Null),
            );
        }

        JsonValue::Object(body)
    }
}
