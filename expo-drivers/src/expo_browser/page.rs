use crate::session::{DriverError, ElementHandle, PageSession, Selector};
use async_trait::async_trait;
use fantoccini::{
    elements::Element,
    error::{CmdError, ErrorStatus},
    wd::TimeoutConfiguration,
    Client, Locator,
};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// How long the resource count must stay flat before the network is idle.
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Reports `[readyState, resource count]`.
///
/// Browsers stop recording resource entries at 250 by default, which would
/// freeze the count on busy pages and read as idle; the buffer is raised once
/// per document before counting.
const IDLE_SNAPSHOT: &str = r#"
    let count = 0;
    try {
        if (!window.__expoTimingBuffer) {
            performance.setResourceTimingBufferSize(100000);
            window.__expoTimingBuffer = true;
        }
        count = performance.getEntriesByType('resource').length;
    } catch (_) {}
    return [document.readyState, count];
"#;

/// WebDriver-backed page that is navigated in place for every URL.
pub struct ExpoPage {
    pub(crate) client: Client,
}

impl ExpoPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Poll `document.readyState` and the resource-timing count until the
    /// document is complete and no new resources have been requested for
    /// [`NETWORK_QUIET`].
    async fn wait_for_network_idle(&self, budget: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        let mut last_count: Option<u64> = None;
        let mut quiet = Duration::ZERO;

        loop {
            let snapshot = self.client.execute(IDLE_SNAPSHOT, vec![]).await?;
            let ready = snapshot.get(0).and_then(|v| v.as_str()) == Some("complete");
            let count = snapshot.get(1).and_then(|v| v.as_u64()).unwrap_or(0);

            if ready && last_count == Some(count) {
                quiet += IDLE_POLL;
                if quiet >= NETWORK_QUIET {
                    debug!(
                        target: "browser.page",
                        resources = count,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "network idle"
                    );
                    return Ok(());
                }
            } else {
                quiet = Duration::ZERO;
            }
            last_count = Some(count);

            if started.elapsed() >= budget {
                return Err(DriverError::Timeout {
                    op: "waiting for network idle".into(),
                    budget,
                });
            }
            sleep(IDLE_POLL).await;
        }
    }
}

enum WebDriverLocator {
    Css(String),
    XPath(String),
}

impl WebDriverLocator {
    fn from_selector(selector: &Selector) -> Self {
        match selector {
            Selector::Css(css) => WebDriverLocator::Css(css.clone()),
            Selector::NextSiblingOfLabel(label) => {
                WebDriverLocator::XPath(label_sibling_xpath(label))
            }
        }
    }

    fn as_locator(&self) -> Locator<'_> {
        match self {
            WebDriverLocator::Css(css) => Locator::Css(css),
            WebDriverLocator::XPath(xpath) => Locator::XPath(xpath),
        }
    }
}

/// Innermost elements whose normalized text equals `label`, then every
/// following sibling of those, in document order.
fn label_sibling_xpath(label: &str) -> String {
    let lit = xpath_literal(label.trim());
    format!(
        "//*[normalize-space(.)={lit} and not(*[normalize-space(.)={lit}])]/following-sibling::*"
    )
}

/// Quote `s` as an XPath 1.0 string literal.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn is_page_load_timeout(err: &CmdError) -> bool {
    matches!(err, CmdError::Standard(wd) if matches!(wd.error, ErrorStatus::Timeout))
}

#[async_trait]
impl PageSession for ExpoPage {
    type Element = ExpoElement;

    async fn goto(&mut self, url: &str, budget: Duration) -> Result<(), DriverError> {
        let started = Instant::now();
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(budget), None))
            .await?;

        match tokio::time::timeout(budget, self.client.goto(url)).await {
            Err(_) => {
                return Err(DriverError::Timeout {
                    op: format!("loading {url}"),
                    budget,
                })
            }
            Ok(Err(e)) if is_page_load_timeout(&e) => {
                return Err(DriverError::Timeout {
                    op: format!("loading {url}"),
                    budget,
                })
            }
            Ok(Err(e)) => {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(())) => {}
        }

        let remaining = budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            warn!(target: "browser.page", %url, "page loaded with no budget left for network idle");
            return Err(DriverError::Timeout {
                op: format!("loading {url}"),
                budget,
            });
        }
        self.wait_for_network_idle(remaining).await
    }

    async fn wait_for(&self, selector: &Selector, budget: Duration) -> Result<(), DriverError> {
        let locator = WebDriverLocator::from_selector(selector);
        match self
            .client
            .wait()
            .at_most(budget)
            .for_element(locator.as_locator())
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(DriverError::Timeout {
                op: format!("waiting for {selector}"),
                budget,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, selector: &Selector) -> Result<Option<ExpoElement>, DriverError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<ExpoElement>, DriverError> {
        let locator = WebDriverLocator::from_selector(selector);
        let elements = self.client.find_all(locator.as_locator()).await?;
        Ok(elements.into_iter().map(ExpoElement::new).collect())
    }
}

// =========================
// ExpoElement Definition
// =========================

#[derive(Clone)]
/// Wrapper for DOM elements located through an [`ExpoPage`].
pub struct ExpoElement {
    pub element: Element,
}

impl ExpoElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

#[async_trait]
impl ElementHandle for ExpoElement {
    async fn inner_text(&self) -> Result<String, DriverError> {
        Ok(self.element.text().await?)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.element.attr(name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_use_single_quotes() {
        assert_eq!(xpath_literal("Branch"), "'Branch'");
    }

    #[test]
    fn apostrophes_switch_to_double_quotes() {
        assert_eq!(xpath_literal("Maker's Mark"), "\"Maker's Mark\"");
    }

    #[test]
    fn mixed_quotes_use_concat() {
        assert_eq!(
            xpath_literal(r#"it's "x""#),
            r#"concat('it', "'", 's "x"')"#
        );
    }

    #[test]
    fn label_xpath_targets_following_siblings() {
        assert_eq!(
            label_sibling_xpath(" ADDRESS "),
            "//*[normalize-space(.)='ADDRESS' and not(*[normalize-space(.)='ADDRESS'])]/following-sibling::*"
        );
    }

    #[test]
    fn idle_snapshot_lifts_the_timing_buffer_before_counting() {
        let raise = IDLE_SNAPSHOT.find("setResourceTimingBufferSize").unwrap();
        let count = IDLE_SNAPSHOT.find("getEntriesByType('resource')").unwrap();
        assert!(raise < count);
        assert!(IDLE_SNAPSHOT.contains("return [document.readyState, count]"));
    }

    #[test]
    fn css_selectors_pass_through() {
        let loc = WebDriverLocator::from_selector(&Selector::css("h1.wrap-word"));
        assert!(matches!(loc, WebDriverLocator::Css(ref s) if s == "h1.wrap-word"));
    }
}
