use crate::expo_browser::page::ExpoPage;
use crate::session::DriverError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::info;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver owns one browser session; [`ExpoDriver::page`] hands out the
/// single page that a harvest navigates in place.
pub struct ExpoDriver {
    pub client: Client,
}

impl ExpoDriver {
    /// Create a new driver connected to a running WebDriver service
    /// (e.g. chromedriver on `http://localhost:9515`).
    pub async fn new(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_arguments(headless) }),
        );
        caps.insert("pageLoadStrategy".to_string(), json!("normal"));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        info!(target: "browser.driver", %webdriver_url, headless, "browser session started");
        Ok(Self { client })
    }

    /// The page (tab) of this session.
    pub fn page(&self) -> ExpoPage {
        ExpoPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await?;
        info!(target: "browser.driver", "browser session closed");
        Ok(())
    }
}

fn chrome_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}
