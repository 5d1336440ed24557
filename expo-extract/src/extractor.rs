use crate::record::{ExhibitorFields, ExhibitorRecord, LabeledLink, Link, TIMEOUT_ERROR};
use crate::rules::{FieldPlan, FieldRule, FieldValue};
use expo_config::ExpoConfig;
use expo_drivers::{DriverError, ElementHandle, PageSession};
use std::time::Duration;
use tracing::{error, info};

/// Turns one exhibitor page into one [`ExhibitorRecord`].
#[derive(Debug, Clone)]
pub struct ExhibitorExtractor {
    plan: FieldPlan,
    navigation_timeout: Duration,
    readiness_timeout: Duration,
}

impl Default for ExhibitorExtractor {
    fn default() -> Self {
        Self::new(
            FieldPlan::default(),
            Duration::from_secs(60),
            Duration::from_secs(30),
        )
    }
}

impl ExhibitorExtractor {
    pub fn new(plan: FieldPlan, navigation_timeout: Duration, readiness_timeout: Duration) -> Self {
        Self {
            plan,
            navigation_timeout,
            readiness_timeout,
        }
    }

    pub fn from_config(config: &ExpoConfig) -> Self {
        Self::new(
            FieldPlan::from_selectors(&config.selectors),
            config.browser.navigation_timeout(),
            config.browser.readiness_timeout(),
        )
    }

    pub fn plan(&self) -> &FieldPlan {
        &self.plan
    }

    /// Navigate `page` to `url`, wait for the heading, then read every field.
    ///
    /// Never fails: a page that does not load becomes a `Failed` record, with
    /// the literal `"Timeout"` when a wait ran out of budget.
    pub async fn extract<P: PageSession>(&self, page: &mut P, url: &str) -> ExhibitorRecord {
        info!(target: "extract", %url, "scraping");
        if let Err(e) = self.load(page, url).await {
            let reason = if e.is_timeout() {
                TIMEOUT_ERROR.to_string()
            } else {
                e.to_string()
            };
            error!(target: "extract", %url, error = %e, "page did not load");
            return ExhibitorRecord::failed(url, reason);
        }
        ExhibitorRecord::Success(self.extract_loaded(page, url).await)
    }

    async fn load<P: PageSession>(&self, page: &mut P, url: &str) -> Result<(), DriverError> {
        page.goto(url, self.navigation_timeout).await?;
        page.wait_for(self.plan.heading(), self.readiness_timeout).await
    }

    /// Read every field from a page that is already loaded.
    ///
    /// A failure in one field is logged and leaves that field empty; the
    /// remaining fields are still read.
    pub async fn extract_loaded<P: PageSession>(&self, page: &P, url: &str) -> ExhibitorFields {
        let mut fields = ExhibitorFields::empty(url);
        for (field, rule) in self.plan.rules() {
            let value = match resolve(page, rule).await {
                Ok(value) => value,
                Err(e) => {
                    error!(
                        target: "extract.field",
                        field = field.key(),
                        %url,
                        error = %e,
                        "field extraction failed"
                    );
                    rule.empty_value()
                }
            };
            fields.set(*field, value);
        }
        fields
    }
}

async fn resolve<P: PageSession>(page: &P, rule: &FieldRule) -> Result<FieldValue, DriverError> {
    let selector = rule.selector();
    match rule {
        FieldRule::Text(_) | FieldRule::LabelSibling(_) => {
            let text = match page.find(&selector).await? {
                Some(el) => el.inner_text().await?,
                None => String::new(),
            };
            Ok(FieldValue::Text(text))
        }
        FieldRule::LabeledLink(_) => {
            let link = match page.find(&selector).await? {
                Some(el) => LabeledLink {
                    text: el.inner_text().await?,
                    url: el.attribute("href").await?.unwrap_or_default(),
                },
                None => LabeledLink::default(),
            };
            Ok(FieldValue::Link(link))
        }
        FieldRule::LinkList(_) => {
            let mut links = Vec::new();
            for el in page.find_all(&selector).await? {
                links.push(Link {
                    title: el.inner_text().await?,
                    url: el.attribute("href").await?.unwrap_or_default(),
                });
            }
            Ok(FieldValue::Links(links))
        }
    }
}
