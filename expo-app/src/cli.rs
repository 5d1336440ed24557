use clap::{Parser, ValueEnum};
use expo_common::OutputFormat;
use expo_config::{Engine, ExpoConfig};
use std::path::PathBuf;

/// Harvest exhibitor profile pages into a CSV or JSON file.
#[derive(Debug, Parser)]
#[command(name = "expo", version, about)]
pub struct Cli {
    /// Configuration file (YAML). Without it `expo.yaml` is used when present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Newline-delimited list of exhibitor URLs.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Page engine: a WebDriver browser or plain HTTP snapshots.
    #[arg(long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Run the browser without a window.
    #[arg(long)]
    pub headless: bool,

    /// WebDriver endpoint, e.g. a running chromedriver.
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    #[value(name = "webdriver")]
    WebDriver,
    Static,
}

impl From<EngineArg> for Engine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::WebDriver => Engine::WebDriver,
            EngineArg::Static => Engine::Static,
        }
    }
}

impl Cli {
    /// Flags given on the command line win over every configuration source.
    pub fn apply(&self, config: &mut ExpoConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format.into();
            // `--format json` alone writes `exhibitors.json`, not JSON into a `.csv`.
            if self.output.is_none() {
                config.output.set_extension(config.format.extension());
            }
        }
        if let Some(engine) = self.engine {
            config.browser.engine = engine.into();
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "expo",
            "--input",
            "urls.txt",
            "--format",
            "json",
            "--engine",
            "static",
            "--headless",
        ]);
        let mut config = ExpoConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.input, PathBuf::from("urls.txt"));
        assert_eq!(config.output, PathBuf::from("exhibitors.json"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.browser.engine, Engine::Static);
        assert!(config.browser.headless);
    }

    #[test]
    fn explicit_output_keeps_its_name() {
        let cli = Cli::parse_from(["expo", "--format", "json", "--output", "dump.csv"]);
        let mut config = ExpoConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.output, PathBuf::from("dump.csv"));
    }

    #[test]
    fn csv_format_keeps_the_default_name() {
        let cli = Cli::parse_from(["expo", "--format", "csv"]);
        let mut config = ExpoConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.output, PathBuf::from("exhibitors.csv"));
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let cli = Cli::parse_from(["expo"]);
        let mut config = ExpoConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, ExpoConfig::default());
    }

    #[test]
    fn webdriver_engine_is_spelled_as_one_word() {
        let cli = Cli::parse_from(["expo", "--engine", "webdriver"]);
        assert_eq!(cli.engine, Some(EngineArg::WebDriver));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
