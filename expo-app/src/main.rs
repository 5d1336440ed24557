use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use expo_common::observability::{init_logging, LogConfig};
use expo_common::ExpoError;
use expo_config::{Engine, ExpoConfig, ExpoConfigLoader};
use expo_drivers::expo_browser::driver::ExpoDriver;
use expo_drivers::snapshot::HtmlPage;
use expo_extract::{harvest, read_url_list, write_harvest, ExhibitorExtractor, HarvestSummary};
use tracing::{info, warn};
mod cli;

const DEFAULT_CONFIG_FILE: &str = "expo.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config: defaults < file < env < flags
    let mut cfg = load_config(&cli)?;
    cli.apply(&mut cfg);
    cfg.validate().map_err(|e| ExpoError::Config(e.to_string()))?;

    // 2) Logging from the resolved config
    let log_file = init_logging(LogConfig {
        app_name: "expo",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    if let Some(path) = log_file {
        info!(log_file = %path.display(), "logging to file");
    }

    // 3) Harvest
    let urls = read_url_list(&cfg.input)?;
    info!(input = %cfg.input.display(), count = urls.len(), "URL list loaded");

    let summary = run(&cfg, &urls).await?;
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "harvest finished"
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ExpoConfig> {
    let loader = match &cli.config {
        Some(path) => ExpoConfigLoader::new().with_file(path),
        None => ExpoConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg = loader
        .load()
        .map_err(|e| ExpoError::Config(e.to_string()))
        .context("loading configuration")?;
    Ok(cfg)
}

async fn run(cfg: &ExpoConfig, urls: &[String]) -> Result<HarvestSummary> {
    let extractor = ExhibitorExtractor::from_config(cfg);

    let records = match cfg.browser.engine {
        Engine::WebDriver => {
            let driver = ExpoDriver::new(&cfg.browser.webdriver_url, cfg.browser.headless)
                .await
                .map_err(|e| ExpoError::Driver(e.into()))
                .with_context(|| format!("connecting to {}", cfg.browser.webdriver_url))?;
            let mut page = driver.page();
            let records = harvest(&mut page, &extractor, urls).await;
            drop(page);
            // Closed on every path: harvest itself never fails.
            if let Err(e) = driver.close().await {
                warn!(target: "browser.driver", error = %e, "failed to close browser session");
            }
            records
        }
        Engine::Static => {
            let mut page = HtmlPage::new().map_err(|e| ExpoError::Driver(e.into()))?;
            harvest(&mut page, &extractor, urls).await
        }
    };

    Ok(write_harvest(&cfg.output, cfg.format, &records)?)
}
