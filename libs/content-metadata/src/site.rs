use crate::Attribute;
use once_cell::sync::OnceCell;

const UPLOAD_PLACEHOLDER: &str = "<%=upload_url%>";
const SITE_PLACEHOLDER: &str = "<%=site_url%>";

/// Site-level metadata used to compose media URLs and substitute URL
/// placeholders in string field values. The placeholder values are derived
/// once and reused for every substitution.
#[derive(Debug, Default)]
pub struct Site {
    pub id: i64,
    pub dns: String,
    pub stage_dns: Option<String>,
    pub upload_url_prefix: Option<String>,
    pub upload_url: String,
    pub use_absolute_upload_url: bool,
    pub replace_urls: bool,
    pub live_virtual_root: String,
    pub stage_virtual_root: String,
    pub is_live: bool,

    pub upload_placeholder: OnceCell<String>,
    pub site_placeholder: OnceCell<String>,
}

impl Clone for Site {
    fn clone(&self) -> Self {
        Site {
            id: self.id,
            dns: self.dns.clone(),
            stage_dns: self.stage_dns.clone(),
            upload_url_prefix: self.upload_url_prefix.clone(),
            upload_url: self.upload_url.clone(),
            use_absolute_upload_url: self.use_absolute_upload_url,
            replace_urls: self.replace_urls,
            live_virtual_root: self.live_virtual_root.clone(),
            stage_virtual_root: self.stage_virtual_root.clone(),
            is_live: self.is_live,
            upload_placeholder: OnceCell::new(),
            site_placeholder: OnceCell::new(),
        }
    }
}

impl Site {
    /// Substitute the upload/site URL placeholders in a field value when the
    /// site has URL replacement enabled.
    pub fn replace_placeholders(&self, input: &str) -> String {
        if !self.replace_urls {
            return input.to_string();
        }

        let upload = self
            .upload_placeholder
            .get_or_init(|| self.images_upload_url(true, false));
        let site = self.site_placeholder.get_or_init(|| self.site_url());

        input
            .replace(UPLOAD_PLACEHOLDER, upload)
            .replace(SITE_PLACEHOLDER, site)
    }

    /// Base URL for media stored in the site shared library.
    pub fn images_upload_url(&self, as_short_as_possible: bool, remove_schema: bool) -> String {
        format!("{}images", self.upload_base_url(as_short_as_possible, remove_schema))
    }

    /// Base URL for media stored in a per-content folder.
    pub fn content_upload_url(&self, content_type_id: i64, as_short_as_possible: bool, remove_schema: bool) -> String {
        let mut url = self.upload_base_url(as_short_as_possible, remove_schema);

        if !url.ends_with('/') {
            url.push('/');
        }

        url.push_str("contents/");
        url.push_str(&content_type_id.to_string());
        url
    }

    fn upload_base_url(&self, as_short_as_possible: bool, remove_schema: bool) -> String {
        let mut url = String::new();
        let prefix = if self.use_absolute_upload_url {
            self.upload_url_prefix.as_deref().unwrap_or("")
        } else {
            ""
        };

        if !prefix.is_empty() {
            if remove_schema {
                url.push_str(&schema_invariant(prefix));
            } else {
                url.push_str(prefix);
            }
        } else if !as_short_as_possible {
            url.push_str(if remove_schema { "//" } else { "http://" });
            url.push_str(self.dns_for(true));
        }

        url.push_str(&self.upload_url);
        url
    }

    pub fn site_url(&self) -> String {
        format!("http://{}{}", self.dns_for(self.is_live), self.site_url_rel())
    }

    pub fn site_url_rel(&self) -> &str {
        if self.is_live {
            &self.live_virtual_root
        } else {
            &self.stage_virtual_root
        }
    }

    fn dns_for(&self, is_live: bool) -> &str {
        match &self.stage_dns {
            Some(stage_dns) if !is_live && !stage_dns.is_empty() => stage_dns,
            _ => &self.dns,
        }
    }
}

fn schema_invariant(prefix: &str) -> String {
    match prefix.strip_prefix("http://") {
        Some(rest) => format!("//{rest}"),
        None => prefix.to_string(),
    }
}

impl Attribute {
    /// Base URL for a media attribute value: the site library or the
    /// per-content upload folder, combined with the attribute sub-folder.
    pub fn media_base_url(&self, site: &Site, as_short_as_possible: bool, remove_schema: bool) -> String {
        debug_assert!(self.type_name.is_media());

        let base = if self.use_site_library {
            site.images_upload_url(as_short_as_possible, remove_schema)
        } else {
            site.content_upload_url(self.content_type_id, as_short_as_possible, remove_schema)
        };

        combine_without_double_slashes(&base, &self.sub_url())
    }

    fn sub_url(&self) -> String {
        match &self.sub_folder {
            Some(folder) if !folder.is_empty() => format!("\\{folder}").replace('\\', "/"),
            _ => String::new(),
        }
    }
}

fn combine_without_double_slashes(first: &str, second: &str) -> String {
    if second.is_empty() {
        return first.to_string();
    }

    let first = first.replace(":/", "://").replace(":///", "://");

    format!(
        "{}/{}",
        first.trim_end_matches('/'),
        second.replace("//", "/").trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeType;

    fn site() -> Site {
        Site {
            id: 1,
            dns: "example.com".into(),
            stage_dns: Some("stage.example.com".into()),
            upload_url_prefix: Some("http://static.example.com".into()),
            upload_url: "/upload/".into(),
            use_absolute_upload_url: true,
            replace_urls: true,
            live_virtual_root: "/".into(),
            stage_virtual_root: "/stage".into(),
            is_live: true,
            ..Default::default()
        }
    }

    fn image_attribute(site_library: bool) -> Attribute {
        Attribute {
            id: 10,
            content_type_id: 5,
            friendly_name: "Cover".into(),
            alias: "cover".into(),
            schema_alias: "cover".into(),
            type_name: AttributeType::Image,
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
            sub_folder: Some("covers".into()),
            use_site_library: site_library,
        }
    }

    #[test]
    fn placeholders_replaced_only_when_enabled() {
        let site = site();
        let replaced = site.replace_placeholders("<%=upload_url%>/a.png and <%=site_url%>/b");

        assert_eq!(
            replaced,
            "http://static.example.com/upload/images/a.png and http://example.com//b"
        );

        let mut silent = site.clone();
        silent.replace_urls = false;
        assert_eq!(silent.replace_placeholders("<%=upload_url%>/a.png"), "<%=upload_url%>/a.png");
    }

    #[test]
    fn media_base_url_uses_content_folder_or_site_library() {
        let site = site();

        assert_eq!(
            image_attribute(false).media_base_url(&site, true, false),
            "http://static.example.com/upload/contents/5/covers"
        );
        assert_eq!(
            image_attribute(true).media_base_url(&site, true, false),
            "http://static.example.com/upload/images/covers"
        );
    }
}
