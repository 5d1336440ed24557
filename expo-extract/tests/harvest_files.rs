use expo_common::OutputFormat;
use expo_drivers::snapshot::HtmlPage;
use expo_extract::{harvest_to_file, read_url_list, ExhibitorExtractor, ExhibitorRecord};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><body>
  <h1 class="wrap-word">Acme Co</h1>
  <div id="exhibitor_details_description"><p>We make widgets</p></div>
</body></html>"#;

const NO_HEADING: &str = "<html><body><div id=\"app\"></div></body></html>";

/// Shared sink for a test-scoped `tracing` subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn extractor() -> ExhibitorExtractor {
    ExhibitorExtractor::new(
        Default::default(),
        Duration::from_secs(5),
        Duration::from_secs(1),
    )
}

async fn site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exhibitor/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exhibitor/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_HEADING))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn no_urls_writes_nothing() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = tempdir().unwrap();
    let output = dir.path().join("exhibitors.csv");
    let mut page = HtmlPage::new().unwrap();

    let summary = harvest_to_file(&mut page, &extractor(), &[], &output, OutputFormat::Csv)
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(summary.output, None);
    assert!(!output.exists());

    let captured = logs.contents();
    let warning = captured
        .lines()
        .find(|line| line.contains("WARN harvest"))
        .expect("a warning about the empty harvest");
    assert!(warning.contains("nothing written"), "{warning}");
    assert!(warning.contains("exhibitors.csv"), "{warning}");
}

#[tokio::test]
async fn timeout_only_run_writes_url_and_error() {
    let server = site().await;
    let url = format!("{}/exhibitor/pending", server.uri());
    let dir = tempdir().unwrap();
    let output = dir.path().join("exhibitors.csv");
    let mut page = HtmlPage::new().unwrap();

    let summary = harvest_to_file(
        &mut page,
        &extractor(),
        &[url.clone()],
        &output,
        OutputFormat::Csv,
    )
    .await
    .unwrap();

    assert_eq!(summary.failed, 1);
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, format!("url,error\n{url},Timeout\n"));
}

#[tokio::test]
async fn mixed_run_uses_the_union_header() {
    let server = site().await;
    let ok = format!("{}/exhibitor/acme", server.uri());
    let pending = format!("{}/exhibitor/pending", server.uri());
    let dir = tempdir().unwrap();
    let output = dir.path().join("exhibitors.csv");
    let mut page = HtmlPage::new().unwrap();

    let summary = harvest_to_file(
        &mut page,
        &extractor(),
        &[ok.clone(), pending.clone()],
        &output,
        OutputFormat::Csv,
    )
    .await
    .unwrap();
    assert_eq!((summary.succeeded, summary.failed), (1, 1));

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), 14);
    assert_eq!(header.get(0), Some("url"));
    assert_eq!(header.get(13), Some("error"));

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(&rows[0][0], ok.as_str());
    assert_eq!(&rows[0][1], "Acme Co");
    assert_eq!(&rows[0][3], "We make widgets");
    assert_eq!(&rows[0][6], "[]");
    assert_eq!(&rows[0][13], "");
    assert_eq!(&rows[1][0], pending.as_str());
    assert_eq!(&rows[1][1], "");
    assert_eq!(&rows[1][13], "Timeout");
}

#[tokio::test]
async fn json_output_keeps_record_shapes() {
    let server = site().await;
    let ok = format!("{}/exhibitor/acme", server.uri());
    let pending = format!("{}/exhibitor/pending", server.uri());
    let dir = tempdir().unwrap();
    let output = dir.path().join("exhibitors.json");
    let mut page = HtmlPage::new().unwrap();

    harvest_to_file(
        &mut page,
        &extractor(),
        &[ok, pending.clone()],
        &output,
        OutputFormat::Json,
    )
    .await
    .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let records: Vec<ExhibitorRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(records.len(), 2);
    let ExhibitorRecord::Success(first) = &records[0] else {
        panic!("expected a success, got {:?}", records[0]);
    };
    assert_eq!(first.name, "Acme Co");
    assert_eq!(records[1], ExhibitorRecord::failed(pending, "Timeout"));
}

#[test]
fn url_list_is_read_from_disk() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("exhibitor_urls.txt");
    let text = "https://expo.example/1\n\n  https://expo.example/2  \n";
    std::fs::write(&list, text).unwrap();

    assert_eq!(
        read_url_list(&list).unwrap(),
        vec!["https://expo.example/1", "https://expo.example/2"]
    );
}
