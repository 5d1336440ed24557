//! Loader for scraper configuration with YAML + environment overlays.
//!
//! Every field has a default equal to the scraper's historical constants, so
//! running without a file behaves exactly like the fixed script did. Sources
//! are merged lowest precedence first: defaults, YAML file(s), then
//! `EXPO_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `EXPO_BROWSER__HEADLESS=true`). String values may reference `${VAR}`.
use config::{Config, ConfigError, Environment, File, FileFormat};
use expo_common::observability::LogFormat;
use expo_common::OutputFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "EXPO";

/// Top-level configuration for one harvest run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpoConfig {
    /// Newline-delimited list of exhibitor profile URLs.
    pub input: PathBuf,
    /// Where the aggregated records are written.
    pub output: PathBuf,
    pub format: OutputFormat,
    pub browser: BrowserConfig,
    pub selectors: SelectorConfig,
    pub logging: LoggingConfig,
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("exhibitor_urls.txt"),
            output: PathBuf::from("exhibitors.csv"),
            format: OutputFormat::Csv,
            browser: BrowserConfig::default(),
            selectors: SelectorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which page engine drives navigation and DOM queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// A real browser behind a WebDriver endpoint (chromedriver, geckodriver).
    #[default]
    WebDriver,
    /// Plain HTTP fetch + static HTML snapshot; no script execution.
    Static,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: Engine,
    pub webdriver_url: String,
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    pub readiness_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Engine::WebDriver,
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            navigation_timeout_secs: 60,
            readiness_timeout_secs: 30,
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }
}

/// CSS selectors and label texts for every extracted field.
///
/// Fields ending in `_label` name the visible text of a marker element; the
/// value is read from the element that follows it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub heading: String,
    pub why_visit: String,
    pub description: String,
    pub branch_label: String,
    pub product_categories_label: String,
    pub gallery: String,
    pub documents: String,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub address_label: String,
    pub stand: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            heading: "h1.wrap-word".into(),
            why_visit: "div#exhibitor_details_showobjective p".into(),
            description: "div#exhibitor_details_description p".into(),
            branch_label: "Branch".into(),
            product_categories_label: "Product Categories".into(),
            gallery: "div.enhanced-slider div.slick-track div.slick-slide \
                      div.product-carousel-image-container div.product-text a.product-link"
                .into(),
            documents: "div.document-section div.inline-block.document-detail-container a".into(),
            website: r#"a[href^="https://www.aatcc.org"]"#.into(),
            email: r#"a[href^="mailto:"]"#.into(),
            phone: "div#exhibitor_details_phone p a".into(),
            address_label: "ADDRESS".into(),
            stand: "div.form-group-view-mode.wrap-word p".into(),
        }
    }
}

impl SelectorConfig {
    fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("heading", self.heading.as_str()),
            ("why_visit", self.why_visit.as_str()),
            ("description", self.description.as_str()),
            ("branch_label", self.branch_label.as_str()),
            (
                "product_categories_label",
                self.product_categories_label.as_str(),
            ),
            ("gallery", self.gallery.as_str()),
            ("documents", self.documents.as_str()),
            ("website", self.website.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("address_label", self.address_label.as_str()),
            ("stand", self.stand.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter; `RUST_LOG` still wins when set.
    pub filter: String,
    pub format: LogFormat,
    /// Optional directory for a daily rolling log file.
    pub dir: Option<PathBuf>,
    pub emit_stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            format: LogFormat::Text,
            dir: None,
            emit_stderr: true,
        }
    }
}

impl ExpoConfig {
    /// Reject values that would make every page fail in a confusing way.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "browser.navigation_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.browser.readiness_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "browser.readiness_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.browser.engine == Engine::WebDriver && self.browser.webdriver_url.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "browser.webdriver_url is required for the webdriver engine".into(),
            ));
        }
        if let Some((key, _)) = self
            .selectors
            .entries()
            .into_iter()
            .find(|(_, v)| v.trim().is_empty())
        {
            return Err(ConfigError::Message(format!(
                "selectors.{key} must not be empty"
            )));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ExpoConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ExpoConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpoConfigLoader {
    /// Start from the built-in defaults; environment overrides are applied at
    /// [`load`](Self::load) time so they beat every file.
    ///
    /// ```
    /// use expo_config::ExpoConfigLoader;
    ///
    /// let config = ExpoConfigLoader::new()
    ///     .with_yaml_str("output: out.csv")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.output.to_str(), Some("out.csv"));
    /// assert_eq!(config.browser.navigation_timeout_secs, 60);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when it does not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use expo_config::{Engine, ExpoConfigLoader};
    ///
    /// let cfg = ExpoConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// browser:
    ///   engine: static
    ///   readiness_timeout_secs: 5
    /// selectors:
    ///   phone: "div.phone"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.browser.engine, Engine::Static);
    /// assert_eq!(cfg.browser.readiness_timeout_secs, 5);
    /// assert_eq!(cfg.selectors.phone, "div.phone");
    /// assert_eq!(cfg.selectors.heading, "h1.wrap-word");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The loader layers `EXPO_`-prefixed environment variables on top of the
    /// files, expands `${VAR}` placeholders, then validates the result.
    ///
    /// ```
    /// use expo_config::ExpoConfigLoader;
    ///
    /// std::env::set_var("DOC_OUT_DIR", "/tmp/expo");
    ///
    /// let config = ExpoConfigLoader::new()
    ///     .with_yaml_str("output: \"${DOC_OUT_DIR}/exhibitors.csv\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.output.to_str(), Some("/tmp/expo/exhibitors.csv"));
    ///
    /// std::env::remove_var("DOC_OUT_DIR");
    /// ```
    pub fn load(self) -> Result<ExpoConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ExpoConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Atlanta")), ("STATE", Some("GA"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Atlanta", { "loc": "Atlanta-GA" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_EXPO}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_EXPO}"));
    }

    #[test]
    fn defaults_match_the_original_constants() {
        let cfg = ExpoConfig::default();
        assert_eq!(cfg.input, PathBuf::from("exhibitor_urls.txt"));
        assert_eq!(cfg.output, PathBuf::from("exhibitors.csv"));
        assert_eq!(cfg.browser.navigation_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.browser.readiness_timeout(), Duration::from_secs(30));
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.selectors.heading, "h1.wrap-word");
        assert_eq!(cfg.selectors.address_label, "ADDRESS");
        let gallery = &cfg.selectors.gallery;
        assert!(gallery.starts_with("div.enhanced-slider div.slick-track"));
        assert!(gallery.ends_with("div.product-text a.product-link"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = ExpoConfig::default();
        cfg.browser.readiness_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("readiness_timeout_secs"));
    }

    #[test]
    fn empty_selector_is_rejected() {
        let mut cfg = ExpoConfig::default();
        cfg.selectors.branch_label = "  ".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("selectors.branch_label"));
    }

    #[test]
    fn static_engine_does_not_need_webdriver_url() {
        let mut cfg = ExpoConfig::default();
        cfg.browser.engine = Engine::Static;
        cfg.browser.webdriver_url.clear();
        assert!(cfg.validate().is_ok());
    }
}
