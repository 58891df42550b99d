//! `[meta]` section configuration.
//!
//! Literal prefixes recognized in a document's metadata block, the body
//! separator line, and the date format shared by parsing and rendering.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[meta]` section in quire.toml.
///
/// # Example
/// ```toml
/// [meta]
/// title = "Title:"
/// author = "Author:"
/// tag = "Tag:"
/// template = "Template:"
/// date = "Date:"
/// separator = "---"
/// date_format = "%Y-%m-%d"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MetaConfig {
    #[serde(default = "defaults::meta::title")]
    #[educe(Default = defaults::meta::title())]
    pub title: String,

    #[serde(default = "defaults::meta::author")]
    #[educe(Default = defaults::meta::author())]
    pub author: String,

    #[serde(default = "defaults::meta::tag")]
    #[educe(Default = defaults::meta::tag())]
    pub tag: String,

    #[serde(default = "defaults::meta::template")]
    #[educe(Default = defaults::meta::template())]
    pub template: String,

    #[serde(default = "defaults::meta::date")]
    #[educe(Default = defaults::meta::date())]
    pub date: String,

    /// Line separating the metadata block from the markdown body.
    #[serde(default = "defaults::meta::separator")]
    #[educe(Default = defaults::meta::separator())]
    pub separator: String,

    /// chrono strftime format, used both to parse `Date:` values and to
    /// format the date handed to templates.
    #[serde(default = "defaults::meta::date_format")]
    #[educe(Default = defaults::meta::date_format())]
    pub date_format: String,
}

impl MetaConfig {
    /// Metadata prefixes paired with their section key, in match priority order.
    pub fn prefixes(&self) -> [(&'static str, &str); 5] {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("tag", &self.tag),
            ("template", &self.template),
            ("date", &self.date),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_meta_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.meta.title, "Title:");
        assert_eq!(config.meta.author, "Author:");
        assert_eq!(config.meta.tag, "Tag:");
        assert_eq!(config.meta.template, "Template:");
        assert_eq!(config.meta.date, "Date:");
        assert_eq!(config.meta.separator, "---");
        assert_eq!(config.meta.date_format, "%-d %B %Y @ %-I:%M%P");
    }

    #[test]
    fn test_meta_config_custom_prefixes() {
        let config: SiteConfig = toml::from_str(
            r##"
            [meta]
            title = "#title"
            separator = "+++"
            date_format = "%Y-%m-%d"
        "##,
        )
        .unwrap();

        assert_eq!(config.meta.title, "#title");
        assert_eq!(config.meta.separator, "+++");
        assert_eq!(config.meta.date_format, "%Y-%m-%d");
        assert_eq!(config.meta.author, "Author:");
    }

    #[test]
    fn test_prefixes_priority_order() {
        let config: SiteConfig = toml::from_str("").unwrap();
        let keys: Vec<_> = config.meta.prefixes().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["title", "author", "tag", "template", "date"]);
    }
}
