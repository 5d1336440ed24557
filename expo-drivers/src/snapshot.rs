//! Static page engine: one HTTP GET per navigation, queries answered from the
//! parsed HTML with no script execution.
//!
//! Useful for server-rendered exhibitor pages and for tests. Pages that build
//! their content client-side need the WebDriver engine instead.

use crate::session::{DriverError, ElementHandle, PageSession, Selector};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("expo-harvest/", env!("CARGO_PKG_VERSION"));

/// A page backed by a fetched HTML document.
///
/// The raw markup is kept rather than the parsed tree so the page stays
/// `Send`; every query parses on demand.
pub struct HtmlPage {
    client: reqwest::Client,
    url: Option<String>,
    html: Option<String>,
}

impl HtmlPage {
    pub fn new() -> Result<Self, DriverError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            url: None,
            html: None,
        }
    }

    /// A page that is already "loaded" with `html`, as if fetched from `url`.
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Some(url.into()),
            html: Some(html.into()),
        }
    }

    /// URL of the last successful navigation.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn markup(&self) -> Result<&str, DriverError> {
        self.html.as_deref().ok_or(DriverError::NotLoaded)
    }

    fn query(
        &self,
        selector: &Selector,
        limit: Option<usize>,
    ) -> Result<Vec<SnapshotElement>, DriverError> {
        let document = Html::parse_document(self.markup()?);
        let mut found = Vec::new();
        match selector {
            Selector::Css(css) => {
                let parsed = scraper::Selector::parse(css).map_err(|e| DriverError::Selector {
                    selector: css.clone(),
                    message: e.to_string(),
                })?;
                for el in document.select(&parsed) {
                    found.push(SnapshotElement::from_element(el));
                    if limit.is_some_and(|n| found.len() >= n) {
                        break;
                    }
                }
            }
            Selector::NextSiblingOfLabel(label) => {
                let label = collapse_whitespace(label);
                for node in document.root_element().descendants() {
                    let Some(el) = ElementRef::wrap(node) else {
                        continue;
                    };
                    if follows_label(el, &label) {
                        found.push(SnapshotElement::from_element(el));
                        if limit.is_some_and(|n| found.len() >= n) {
                            break;
                        }
                    }
                }
            }
        }
        Ok(found)
    }
}

/// True when some earlier element sibling of `el` is a label carrying
/// exactly `label` as its text.
fn follows_label(el: ElementRef<'_>, label: &str) -> bool {
    el.prev_siblings()
        .filter_map(ElementRef::wrap)
        .any(|sibling| is_label(sibling, label))
}

/// The innermost element whose whole text is `label`: a wrapper around such
/// an element does not count.
fn is_label(el: ElementRef<'_>, label: &str) -> bool {
    if visible_text(el) != label {
        return false;
    }
    !el.children()
        .filter_map(ElementRef::wrap)
        .any(|child| visible_text(child) == label)
}

fn visible_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl PageSession for HtmlPage {
    type Element = SnapshotElement;

    async fn goto(&mut self, url: &str, budget: Duration) -> Result<(), DriverError> {
        self.url = None;
        self.html = None;

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                DriverError::Timeout {
                    op: format!("loading {url}"),
                    budget,
                }
            } else {
                DriverError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(budget)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        let body = response.text().await.map_err(classify)?;

        debug!(target: "browser.snapshot", %url, bytes = body.len(), "page fetched");
        self.url = Some(url.to_string());
        self.html = Some(body);
        Ok(())
    }

    /// A static document never changes, so the wait is decided immediately.
    async fn wait_for(&self, selector: &Selector, budget: Duration) -> Result<(), DriverError> {
        if self.query(selector, Some(1))?.is_empty() {
            let url = self.url().unwrap_or("an unloaded page");
            return Err(DriverError::Timeout {
                op: format!("waiting for {selector} on {url}"),
                budget,
            });
        }
        Ok(())
    }

    async fn find(&self, selector: &Selector) -> Result<Option<SnapshotElement>, DriverError> {
        Ok(self.query(selector, Some(1))?.into_iter().next())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<SnapshotElement>, DriverError> {
        self.query(selector, None)
    }
}

/// Detached copy of an element's text and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotElement {
    text: String,
    attrs: HashMap<String, String>,
}

impl SnapshotElement {
    fn from_element(el: ElementRef<'_>) -> Self {
        Self {
            text: visible_text(el),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl ElementHandle for SnapshotElement {
    async fn inner_text(&self) -> Result<String, DriverError> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.attrs.get(name).cloned())
    }
}
