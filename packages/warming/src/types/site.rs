//! Site and site-language value types.
//!
//! Sites are owned by the host platform's site registry; this library
//! treats them as read-only input values. The configuration maps carry
//! free-form deployment settings, of which only the `exclude` flag and
//! the `sitemap_path` override are interpreted here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Configuration key marking a site or language as excluded from warmup.
pub const CONFIG_EXCLUDE: &str = "exclude";

/// Configuration key overriding the sitemap location for a site or language.
pub const CONFIG_SITEMAP_PATH: &str = "sitemap_path";

/// A site of the content platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Unique site identifier (e.g. "shop")
    identifier: String,

    /// Root page id of the site tree
    root_page_id: u32,

    /// Base URL the site is served from
    base: Url,

    /// Ordered languages; the entry with id 0 is the default
    languages: Vec<SiteLanguage>,

    /// Free-form site configuration
    #[serde(default)]
    configuration: Map<String, Value>,
}

impl Site {
    /// Create a new site with a single default language derived from the base URL.
    pub fn new(identifier: impl Into<String>, root_page_id: u32, base: Url) -> Self {
        let default_language = SiteLanguage::new(0, base.clone(), "Default");
        Self {
            identifier: identifier.into(),
            root_page_id,
            base,
            languages: vec![default_language],
            configuration: Map::new(),
        }
    }

    /// Replace the language set. An empty iterator keeps the current set.
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = SiteLanguage>) -> Self {
        let languages: Vec<_> = languages.into_iter().collect();
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    /// Add a single language.
    pub fn with_language(mut self, language: SiteLanguage) -> Self {
        self.languages.retain(|l| l.id() != language.id());
        self.languages.push(language);
        self
    }

    /// Set a configuration entry.
    pub fn with_configuration(mut self, key: impl Into<String>, value: Value) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn root_page_id(&self) -> u32 {
        self.root_page_id
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn languages(&self) -> &[SiteLanguage] {
        &self.languages
    }

    /// The default language: id 0 if present, otherwise the first entry.
    pub fn default_language(&self) -> &SiteLanguage {
        self.languages
            .iter()
            .find(|l| l.id() == 0)
            .unwrap_or(&self.languages[0])
    }

    /// Look up a language by id.
    pub fn language(&self, language_id: u32) -> Option<&SiteLanguage> {
        self.languages.iter().find(|l| l.id() == language_id)
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    /// Whether the site opts out of cache warmup entirely.
    pub fn excluded(&self) -> bool {
        self.configuration
            .get(CONFIG_EXCLUDE)
            .is_some_and(coerce_bool)
    }

    /// Site-wide sitemap path override, if configured.
    pub fn sitemap_path(&self) -> Option<&str> {
        self.configuration
            .get(CONFIG_SITEMAP_PATH)
            .and_then(Value::as_str)
    }
}

/// A language of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLanguage {
    /// Language id; 0 is the default language
    language_id: u32,

    /// Base URL this language is served from
    base: Url,

    /// Human-readable language title
    title: String,

    /// Disabled languages are never warmed up
    enabled: bool,

    /// Free-form language configuration
    #[serde(default)]
    configuration: Map<String, Value>,
}

impl SiteLanguage {
    pub fn new(language_id: u32, base: Url, title: impl Into<String>) -> Self {
        Self {
            language_id,
            base,
            title: title.into(),
            enabled: true,
            configuration: Map::new(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set a configuration entry.
    pub fn with_configuration(mut self, key: impl Into<String>, value: Value) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> u32 {
        self.language_id
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    /// Whether this language opts out of cache warmup.
    pub fn excluded(&self) -> bool {
        self.configuration
            .get(CONFIG_EXCLUDE)
            .is_some_and(coerce_bool)
    }

    /// Language-specific sitemap path override, if configured.
    pub fn sitemap_path(&self) -> Option<&str> {
        self.configuration
            .get(CONFIG_SITEMAP_PATH)
            .and_then(Value::as_str)
    }
}

/// Coerce a free-form configuration value into a boolean.
///
/// Accepts booleans, non-zero numbers and the usual truthy strings;
/// everything else is false.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> Site {
        Site::new("shop", 1, Url::parse("https://shop.example").unwrap())
            .with_languages([
                SiteLanguage::new(0, Url::parse("https://shop.example").unwrap(), "English"),
                SiteLanguage::new(1, Url::parse("https://shop.example/de/").unwrap(), "German"),
            ])
    }

    #[test]
    fn test_default_language_is_id_zero() {
        assert_eq!(site().default_language().id(), 0);

        // Without an id-0 language the first entry wins
        let site = Site::new("intranet", 10, Url::parse("https://intra.example").unwrap())
            .with_languages([SiteLanguage::new(
                2,
                Url::parse("https://intra.example").unwrap(),
                "French",
            )]);
        assert_eq!(site.default_language().id(), 2);
    }

    #[test]
    fn test_exclude_flag_coercion() {
        for value in [json!(true), json!(1), json!("1"), json!("yes"), json!("on")] {
            let site = site().with_configuration(CONFIG_EXCLUDE, value.clone());
            assert!(site.excluded(), "expected excluded for {value}");
        }
        for value in [json!(false), json!(0), json!(""), json!("no"), json!(null)] {
            let site = site().with_configuration(CONFIG_EXCLUDE, value.clone());
            assert!(!site.excluded(), "expected not excluded for {value}");
        }
        // Absent flag means not excluded
        assert!(!site().excluded());
    }

    #[test]
    fn test_sitemap_path_override() {
        assert_eq!(site().sitemap_path(), None);

        let site = site().with_configuration(CONFIG_SITEMAP_PATH, json!("custom/sitemap.xml"));
        assert_eq!(site.sitemap_path(), Some("custom/sitemap.xml"));
    }

    #[test]
    fn test_language_lookup() {
        let site = site();
        assert_eq!(site.language(1).unwrap().title(), "German");
        assert!(site.language(99).is_none());
    }
}
