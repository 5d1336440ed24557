//! One pass over the URL list, ending in a single output file.

use crate::export::write_records;
use crate::extractor::ExhibitorExtractor;
use crate::record::ExhibitorRecord;
use expo_common::{ExpoError, OutputFormat, Result};
use expo_drivers::PageSession;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Totals for a finished harvest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Where the records were written; `None` when there was nothing to write.
    pub output: Option<PathBuf>,
}

/// Read a newline-delimited URL list. Lines are trimmed and blank lines are
/// skipped; nothing else is validated.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| ExpoError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_url_list(&text))
}

pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Visit every URL in order on the one `page`, producing one record per URL.
pub async fn harvest<P: PageSession>(
    page: &mut P,
    extractor: &ExhibitorExtractor,
    urls: &[String],
) -> Vec<ExhibitorRecord> {
    let mut records = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        info!(target: "harvest", index = i + 1, total = urls.len(), %url, "visiting");
        records.push(extractor.extract(page, url).await);
    }
    records
}

/// [`harvest`] then [`write_harvest`].
pub async fn harvest_to_file<P: PageSession>(
    page: &mut P,
    extractor: &ExhibitorExtractor,
    urls: &[String],
    output: &Path,
    format: OutputFormat,
) -> Result<HarvestSummary> {
    let records = harvest(page, extractor, urls).await;
    write_harvest(output, format, &records)
}

/// Write the records of a finished harvest to `output`.
///
/// With no records the output file is not created and a warning is logged.
pub fn write_harvest(
    output: &Path,
    format: OutputFormat,
    records: &[ExhibitorRecord],
) -> Result<HarvestSummary> {
    let failed = records.iter().filter(|r| r.is_failed()).count();
    let mut summary = HarvestSummary {
        total: records.len(),
        succeeded: records.len() - failed,
        failed,
        output: None,
    };

    if records.is_empty() {
        warn!(
            target: "harvest",
            output = %output.display(),
            "no exhibitors scraped; nothing written"
        );
        return Ok(summary);
    }

    write_records(output, format, records)?;
    info!(
        target: "harvest",
        output = %output.display(),
        total = summary.total,
        failed = summary.failed,
        "results written"
    );
    summary.output = Some(output.to_path_buf());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_skips_blank_lines() {
        let urls = parse_url_list("  https://a.example/1 \n\n\t\nhttps://a.example/2\r\n");
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/2"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let urls = parse_url_list("https://a.example/1\nhttps://a.example/1\n");
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn missing_list_is_an_input_error() {
        let err = read_url_list(Path::new("/nonexistent/exhibitor_urls.txt")).unwrap_err();
        assert!(matches!(err, ExpoError::Input { .. }));
    }
}
