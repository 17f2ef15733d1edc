use crate::{FilterMap, Identifier, InputField, InputObjectType, InputType, ScalarKind};
use content_metadata::{
    system_fields, Attribute, AttributeType, ContentType, FilterDefinition, FilterOperator,
    RelationKind,
};

/// Synthesize the filter input type for a content type, together with the
/// side table mapping every generated filter field back to its definition.
pub(super) fn filter_type(content: &ContentType, type_name: &str) -> (InputObjectType, FilterMap) {
    let mut builder = FilterTypeBuilder::default();

    builder.system_field(system_fields::ID.name, system_fields::ID.db_name, NUMERIC_OPERATORS);
    builder.system_field(
        system_fields::STATUS_TYPE_ID.name,
        system_fields::STATUS_TYPE_ID.db_name,
        NUMERIC_OPERATORS,
    );
    builder.system_datetime_field(system_fields::CREATED.name, system_fields::CREATED.db_name);
    builder.system_datetime_field(system_fields::MODIFIED.name, system_fields::MODIFIED.db_name);
    builder.system_field(
        system_fields::LAST_MODIFIED_BY.name,
        system_fields::LAST_MODIFIED_BY.db_name,
        NUMERIC_OPERATORS,
    );

    for attribute in &content.attributes {
        // Columns with unsanitizable physical names get no filters.
        if attribute.is_classifier || attribute.alias.contains(' ') {
            continue;
        }

        builder.attribute_fields(attribute);
    }

    let filter_type = InputObjectType {
        identifier: Identifier::filter(type_name),
        description: Some(format!("Filter object for content type {type_name}")),
        fields: builder.fields,
    };

    (filter_type, builder.map)
}

const EQUALITY_OPERATORS: &[FilterOperator] = &[FilterOperator::Equal, FilterOperator::NotEqual];

const NUMERIC_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equal,
    FilterOperator::NotEqual,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterOrEqual,
    FilterOperator::LessThan,
    FilterOperator::LessOrEqual,
];

const TEXT_OPERATORS: &[FilterOperator] = &[FilterOperator::Like, FilterOperator::NotLike];

#[derive(Default)]
struct FilterTypeBuilder {
    fields: Vec<InputField>,
    map: FilterMap,
}

impl FilterTypeBuilder {
    fn system_field(&mut self, name: &str, db_name: &str, operators: &[FilterOperator]) {
        self.column_fields(name, db_name, AttributeType::Numeric, ScalarKind::Decimal, operators);
    }

    fn system_datetime_field(&mut self, name: &str, db_name: &str) {
        self.column_fields(
            name,
            db_name,
            AttributeType::DateTime,
            ScalarKind::DateTime,
            NUMERIC_OPERATORS,
        );
    }

    fn attribute_fields(&mut self, attribute: &Attribute) {
        let name = attribute.schema_alias.as_str();
        let db_name = attribute.alias.as_str();

        match attribute.type_name {
            AttributeType::String | AttributeType::Textbox | AttributeType::RichText => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::String, TEXT_OPERATORS);
            }
            AttributeType::Numeric => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::Decimal, NUMERIC_OPERATORS);
            }
            AttributeType::Boolean => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::Boolean, EQUALITY_OPERATORS);
            }
            AttributeType::Date => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::Date, NUMERIC_OPERATORS);
            }
            AttributeType::Time => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::Time, NUMERIC_OPERATORS);
            }
            AttributeType::DateTime => {
                self.column_fields(name, db_name, attribute.type_name, ScalarKind::DateTime, NUMERIC_OPERATORS);
            }
            AttributeType::Relation => match attribute.relation_kind() {
                Ok(Some(RelationKind::OneToMany { .. })) => {
                    self.column_fields(name, db_name, attribute.type_name, ScalarKind::Int, EQUALITY_OPERATORS);
                    self.column_list_field(name, db_name, attribute.type_name, FilterOperator::In);
                    self.column_list_field(name, db_name, attribute.type_name, FilterOperator::NotIn);
                }
                Ok(Some(RelationKind::ManyToMany { relation_id, is_backward, .. })) => {
                    self.m2m_field(name, relation_id, is_backward, FilterOperator::Contains);
                    self.m2m_field(name, relation_id, is_backward, FilterOperator::NotContains);
                }
                // Ambiguous relations become fatal during field wiring;
                // classifier links and anything else gets no filter.
                _ => {}
            },
            // Media URLs and backward relations are not filterable.
            AttributeType::File
            | AttributeType::Image
            | AttributeType::DynamicImage
            | AttributeType::RelationManyToOne => {}
        }
    }

    fn column_fields(
        &mut self,
        name: &str,
        db_name: &str,
        field_type: AttributeType,
        scalar: ScalarKind,
        operators: &[FilterOperator],
    ) {
        for operator in operators {
            let field_name = format!("{name}{}", operator.as_suffix());

            self.fields.push(
                InputField::new(&field_name, InputType::Scalar(scalar)).description(format!(
                    "Filter for rows where {name} satisfies `{}`",
                    operator.as_suffix()
                )),
            );
            self.map.insert(
                &field_name,
                FilterDefinition::Field {
                    field_name: db_name.to_string(),
                    field_type,
                    operator: *operator,
                },
            );
        }
    }

    fn column_list_field(
        &mut self,
        name: &str,
        db_name: &str,
        field_type: AttributeType,
        operator: FilterOperator,
    ) {
        let field_name = format!("{name}{}", operator.as_suffix());
        let membership = if operator == FilterOperator::In { "in" } else { "not in" };

        self.fields.push(
            InputField::new(&field_name, InputType::list(InputType::Scalar(ScalarKind::Int)))
                .description(format!("Filter for rows where {name} is {membership} the given id set")),
        );
        self.map.insert(
            &field_name,
            FilterDefinition::Field {
                field_name: db_name.to_string(),
                field_type,
                operator,
            },
        );
    }

    fn m2m_field(&mut self, name: &str, relation_id: i64, is_backward: bool, operator: FilterOperator) {
        let field_name = format!("{name}{}", operator.as_suffix());

        self.fields.push(
            InputField::new(&field_name, InputType::list(InputType::Scalar(ScalarKind::Int)))
                .description(format!("Filter for rows whose {name} relation matches the given id set")),
        );
        self.map.insert(
            &field_name,
            FilterDefinition::ManyToMany {
                relation_id,
                is_backward,
                operator,
            },
        );
    }
}
