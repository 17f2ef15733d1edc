use crate::{ContentCatalog, ContentType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static SYMBOLS_TO_REPLACE: Lazy<Regex> = Lazy::new(|| Regex::new("[^_a-zA-Z0-9]+").unwrap());

/// Validate a freshly loaded catalog: sanitize and deduplicate aliases,
/// reserve the synthetic `Id` field name, and fold extension types into
/// their base types. Violations are logged and drop the offending field;
/// only structural relation inconsistencies are left for the schema builder
/// to treat as fatal.
pub fn validate(metadata: ContentCatalog) -> ContentCatalog {
    let mut validated = ContentCatalog::new();
    let mut singular_counter: HashMap<String, u32> = HashMap::new();
    let mut plural_counter: HashMap<String, u32> = HashMap::new();

    for (id, mut content) in metadata {
        content.alias_singular = sanitize_type_alias(&content.alias_singular, &format!("Content{id}"));
        content.alias_plural = sanitize_type_alias(&content.alias_plural, &format!("Contents{id}"));

        content.alias_singular = deduplicate(&mut singular_counter, content.alias_singular);
        content.alias_plural = deduplicate(&mut plural_counter, content.alias_plural);

        validate_fields(&mut content);
        validated.insert(id, content);
    }

    group_extensions(validated)
}

fn validate_fields(content: &mut ContentType) {
    let mut field_counter: HashMap<String, u32> = HashMap::new();
    let mut attributes = Vec::with_capacity(content.attributes.len());

    for mut attribute in content.attributes.drain(..) {
        if attribute.alias.eq_ignore_ascii_case(crate::system_fields::ID.name) {
            // Reserved for the synthetic identifier field.
            attribute.schema_alias = format!("{}Field", attribute.alias);
        } else {
            attribute.schema_alias = SYMBOLS_TO_REPLACE.replace_all(&attribute.alias, "_").into_owned();
        }

        if !is_valid_identifier(&attribute.schema_alias) {
            tracing::warn!(
                attribute_id = attribute.id,
                content_type_id = attribute.content_type_id,
                alias = %attribute.alias,
                "field alias does not sanitize to a valid identifier, dropping field",
            );
            continue;
        }

        attribute.schema_alias = deduplicate(&mut field_counter, attribute.schema_alias);
        attributes.push(attribute);
    }

    content.attributes = attributes;
}

fn sanitize_type_alias(alias: &str, fallback: &str) -> String {
    let sanitized = SYMBOLS_TO_REPLACE.replace_all(alias, "_").into_owned();

    if is_valid_identifier(&sanitized) {
        sanitized
    } else {
        tracing::warn!(alias, fallback, "content type alias is not a valid identifier, using fallback");
        fallback.to_string()
    }
}

/// Identifier grammar: letters, digits and underscore, non-empty, not
/// starting with a digit.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Case-insensitive first-seen-order deduplication with `_2`, `_3`, …
/// suffixes. Counts the suffixed name as taken too, so a third collision
/// cannot land on an already-issued suffix.
fn deduplicate(counter: &mut HashMap<String, u32>, alias: String) -> String {
    let position = bump(counter, &alias);

    if position > 1 {
        let suffixed = format!("{alias}_{position}");
        bump(counter, &suffixed);
        suffixed
    } else {
        alias
    }
}

fn bump(counter: &mut HashMap<String, u32>, alias: &str) -> u32 {
    let entry = counter.entry(alias.to_lowercase()).or_insert(0);
    *entry += 1;
    *entry
}

/// Fold extension types into their base type's `extensions` list. A type
/// whose attributes include a classifier link moves under the base the link
/// points at, provided the link matches the base's own classifier
/// attribute. Extension fields shadowing a base field get prefixed with the
/// extension's singular alias.
fn group_extensions(mut metadata: ContentCatalog) -> ContentCatalog {
    let extension_ids: Vec<i64> = metadata
        .values()
        .filter(|c| !c.has_extensions() && c.is_extension())
        .map(|c| c.id)
        .collect();

    for id in extension_ids {
        let Some(extension) = metadata.get(&id) else { continue };
        let Some(link) = extension.classifier_link() else { continue };

        let classifier_attribute_id = link.classifier_attribute_id.unwrap_or_default();
        let Some(base_id) = link.related_o2m_content_id else {
            tracing::warn!(
                content_type_id = id,
                "extension link has no base content reference, dropping type",
            );
            metadata.remove(&id);
            continue;
        };

        let base_classifier_id = metadata
            .get(&base_id)
            .and_then(|base| base.classifier())
            .map(|classifier| classifier.id);

        // The type leaves the top level whether or not the link checks out.
        let Some(mut extension) = metadata.remove(&id) else { continue };

        match (base_classifier_id, metadata.get_mut(&base_id)) {
            (Some(classifier_id), Some(base)) if classifier_id == classifier_attribute_id => {
                prefix_shadowed_fields(base, &mut extension);
                base.extensions.push(extension);
            }
            _ => {
                tracing::warn!(
                    content_type_id = id,
                    base_content_type_id = base_id,
                    "extension link does not match the base classifier, dropping type",
                );
            }
        }
    }

    metadata
}

fn prefix_shadowed_fields(base: &ContentType, extension: &mut ContentType) {
    let prefix = extension.alias_singular.clone();

    for attribute in &mut extension.attributes {
        let shadows_base = base
            .attributes
            .iter()
            .any(|b| b.schema_alias.eq_ignore_ascii_case(&attribute.schema_alias));

        if shadows_base {
            attribute.schema_alias = format!("{prefix}_{}", attribute.schema_alias);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, AttributeType, Site};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn site() -> Arc<Site> {
        Arc::new(Site::default())
    }

    fn content(id: i64, singular: &str, plural: &str) -> ContentType {
        ContentType {
            id,
            friendly_name: format!("Content {id}"),
            alias_singular: singular.into(),
            alias_plural: plural.into(),
            description: None,
            site: site(),
            attributes: vec![],
            extensions: vec![],
        }
    }

    fn attribute(id: i64, content_id: i64, alias: &str, type_name: AttributeType) -> Attribute {
        Attribute {
            id,
            content_type_id: content_id,
            friendly_name: alias.to_string(),
            alias: alias.to_string(),
            schema_alias: alias.to_string(),
            type_name,
            indexed: false,
            required: false,
            related_o2m_content_id: None,
            related_m2m_content_id: None,
            m2m_relation_id: None,
            m2m_is_backward: None,
            related_m2o_content_id: None,
            m2o_backward_field: None,
            classifier_attribute_id: None,
            is_classifier: false,
            sub_folder: None,
            use_site_library: false,
        }
    }

    fn catalog(contents: Vec<ContentType>) -> ContentCatalog {
        contents.into_iter().map(|c| (c.id, c)).collect()
    }

    #[test]
    fn content_aliases_deduplicate_in_id_order() {
        let validated = validate(catalog(vec![
            content(1, "Article", "Articles"),
            content(2, "Article", "Articles"),
            content(3, "article", "articles"),
        ]));

        assert_eq!(validated[&1].alias_singular, "Article");
        assert_eq!(validated[&2].alias_singular, "Article_2");
        assert_eq!(validated[&3].alias_singular, "article_3");
        assert_eq!(validated[&3].alias_plural, "articles_3");
    }

    #[test]
    fn deduplication_is_idempotent_for_the_same_input() {
        let build = || {
            catalog(vec![
                content(1, "News", "News"),
                content(2, "News", "News"),
            ])
        };

        let first = validate(build());
        let second = validate(build());

        let names =
            |c: &ContentCatalog| c.values().map(|v| v.alias_singular.clone()).collect::<Vec<_>>();

        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn invalid_fields_are_dropped_but_the_type_survives() {
        let mut c = content(1, "Article", "Articles");
        c.attributes.push(attribute(1, 1, "1starts_with_digit", AttributeType::String));
        c.attributes.push(attribute(2, 1, "заголовок", AttributeType::String));
        c.attributes.push(attribute(3, 1, "good name", AttributeType::String));

        let validated = validate(catalog(vec![c]));
        let survivors: Vec<_> = validated[&1]
            .attributes
            .iter()
            .map(|a| a.schema_alias.clone())
            .collect();

        // Cyrillic sanitizes to a bare underscore run, which is a valid
        // identifier; the digit-led alias is gone.
        assert_eq!(survivors, vec!["_".to_string(), "good_name".to_string()]);
    }

    #[test]
    fn id_field_is_renamed() {
        let mut c = content(1, "Article", "Articles");
        c.attributes.push(attribute(1, 1, "Id", AttributeType::Numeric));
        c.attributes.push(attribute(2, 1, "Title", AttributeType::String));

        let validated = validate(catalog(vec![c]));

        assert_eq!(validated[&1].attributes[0].schema_alias, "IdField");
        // The physical column alias is untouched.
        assert_eq!(validated[&1].attributes[0].alias, "Id");
    }

    #[test]
    fn field_aliases_deduplicate_case_insensitively() {
        let mut c = content(1, "Article", "Articles");
        c.attributes.push(attribute(1, 1, "Title", AttributeType::String));
        c.attributes.push(attribute(2, 1, "title", AttributeType::String));

        let validated = validate(catalog(vec![c]));
        let aliases: Vec<_> = validated[&1]
            .attributes
            .iter()
            .map(|a| a.schema_alias.clone())
            .collect();

        assert_eq!(aliases, vec!["Title".to_string(), "title_2".to_string()]);
    }

    #[test]
    fn extensions_fold_under_their_base() {
        let mut base = content(1, "Page", "Pages");
        let mut classifier = attribute(10, 1, "kind", AttributeType::Relation);
        classifier.is_classifier = true;
        classifier.related_o2m_content_id = Some(99);
        base.attributes.push(classifier);
        base.attributes.push(attribute(11, 1, "Title", AttributeType::String));

        let mut extension = content(2, "VideoPage", "VideoPages");
        let mut link = attribute(20, 2, "parent", AttributeType::Relation);
        link.classifier_attribute_id = Some(10);
        link.related_o2m_content_id = Some(1);
        extension.attributes.push(link);
        extension.attributes.push(attribute(21, 2, "Title", AttributeType::String));
        extension.attributes.push(attribute(22, 2, "Url", AttributeType::String));

        let validated = validate(catalog(vec![base, extension]));

        assert_eq!(validated.len(), 1);
        let base = &validated[&1];
        assert_eq!(base.extensions.len(), 1);

        let extension = &base.extensions[0];
        let aliases: Vec<_> = extension.attributes.iter().map(|a| a.schema_alias.clone()).collect();

        // `Title` shadows the base field and gets the extension prefix.
        assert_eq!(
            aliases,
            vec!["parent".to_string(), "VideoPage_Title".to_string(), "Url".to_string()]
        );
    }

    #[test]
    fn mismatched_classifier_link_drops_the_extension() {
        let mut base = content(1, "Page", "Pages");
        let mut classifier = attribute(10, 1, "kind", AttributeType::Relation);
        classifier.is_classifier = true;
        classifier.related_o2m_content_id = Some(99);
        base.attributes.push(classifier);

        let mut extension = content(2, "VideoPage", "VideoPages");
        let mut link = attribute(20, 2, "parent", AttributeType::Relation);
        link.classifier_attribute_id = Some(555);
        link.related_o2m_content_id = Some(1);
        extension.attributes.push(link);

        let validated = validate(catalog(vec![base, extension]));

        assert_eq!(validated.len(), 1);
        assert!(validated[&1].extensions.is_empty());
    }
}
