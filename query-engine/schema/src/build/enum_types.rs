use crate::{EnumType, EnumValue, Identifier};
use content_metadata::{system_fields, ContentType, OrderByToken};

/// Synthesize the order-by enum for a content type: `{field}Asc`/`{field}Desc`
/// per indexed attribute plus the system fields. Omitted entirely when no
/// attribute is indexed.
pub(super) fn order_enum(content: &ContentType, type_name: &str) -> Option<EnumType> {
    if !content.attributes.iter().any(|a| a.indexed && !a.is_classifier) {
        return None;
    }

    let mut values = Vec::new();

    for attribute in content.attributes.iter().filter(|a| a.indexed && !a.is_classifier) {
        push_sort_values(&mut values, &attribute.schema_alias, &attribute.alias);
    }

    for field in system_fields::ALL {
        push_sort_values(&mut values, field.name, field.db_name);
    }

    Some(EnumType {
        identifier: Identifier::order_enum(type_name),
        description: Some(format!("Possible order by literals for content type {type_name}")),
        values,
    })
}

fn push_sort_values(values: &mut Vec<EnumValue>, name: &str, db_name: &str) {
    values.push(EnumValue {
        name: format!("{name}Asc"),
        description: Some(format!("Order by {name} ascending")),
        token: OrderByToken::asc(db_name),
    });
    values.push(EnumValue {
        name: format!("{name}Desc"),
        description: Some(format!("Order by {name} descending")),
        token: OrderByToken::desc(db_name),
    });
}
