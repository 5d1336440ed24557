use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How an element is located on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// A CSS selector.
    Css(String),
    /// Elements that follow, as siblings, an element whose own visible text
    /// is exactly the given label (e.g. `"Branch"` followed by its value).
    NextSiblingOfLabel(String),
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }

    pub fn next_sibling_of_label(label: impl Into<String>) -> Self {
        Selector::NextSiblingOfLabel(label.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "{css}"),
            Selector::NextSiblingOfLabel(label) => write!(f, "label {label:?} ~ *"),
        }
    }
}

/// Errors reported by a page engine.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A bounded wait ran out of budget.
    #[error("timed out after {budget:?} while {op}")]
    Timeout { op: String, budget: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("no page has been loaded")]
    NotLoaded,

    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session could not be started: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// A located element whose text and attributes can be read.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Rendered (visible) text of the element.
    async fn inner_text(&self) -> Result<String, DriverError>;

    /// Raw value of the named attribute, `None` when absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;
}

/// One reusable page (tab) that is navigated in place from URL to URL.
#[async_trait]
pub trait PageSession: Send + Sync {
    type Element: ElementHandle;

    /// Navigate to `url` and wait until the network is idle, within `budget`.
    async fn goto(&mut self, url: &str, budget: Duration) -> Result<(), DriverError>;

    /// Wait until `selector` matches at least one element, within `budget`.
    async fn wait_for(&self, selector: &Selector, budget: Duration) -> Result<(), DriverError>;

    /// First element matching `selector` in document order.
    async fn find(&self, selector: &Selector) -> Result<Option<Self::Element>, DriverError>;

    /// Every element matching `selector` in document order.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>, DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_classified() {
        let err = DriverError::Timeout {
            op: "waiting for h1".into(),
            budget: Duration::from_secs(30),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timed out after 30s while waiting for h1");

        let nav = DriverError::Navigation {
            url: "https://expo.example/x".into(),
            message: "dns".into(),
        };
        assert!(!nav.is_timeout());
    }

    #[test]
    fn selectors_render_readably() {
        assert_eq!(Selector::css("h1.wrap-word").to_string(), "h1.wrap-word");
        assert_eq!(
            Selector::next_sibling_of_label("Branch").to_string(),
            "label \"Branch\" ~ *"
        );
    }
}
