use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use dref_import_template::api::{FileReferenceSource, ReferenceDataSource};
use dref_import_template::dref::{DrefTemplate, SectorDescriptions, dref_type_label};
use dref_import_template::template::export::{
    DirectorySink, DownloadSink, ExportRequest, LogoSource, TemplateExporter, XLSX_MIME_TYPE,
};

#[derive(Default)]
struct MemorySink {
    files: Mutex<Vec<(String, String, Vec<u8>)>>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn deliver(&self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.files
            .lock()
            .unwrap()
            .push((file_name.to_string(), mime_type.to_string(), bytes));
        Ok(PathBuf::from(file_name))
    }
}

async fn dref_template() -> (DrefTemplate, String) {
    let source = FileReferenceSource::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/reference_data.json"),
    );
    let reference = source.load().await.unwrap();
    let label = dref_type_label(&reference, 2);
    let template =
        DrefTemplate::build(&reference, &SectorDescriptions::embedded().unwrap(), 5).unwrap();
    (template, label)
}

fn request<'a>(template: &'a DrefTemplate, label: &str) -> ExportRequest<'a> {
    ExportRequest {
        source: template.source(),
        settings: template.render_settings(),
        logo: LogoSource::None,
        type_label: label.to_string(),
    }
}

#[tokio::test]
async fn test_generate_delivers_workbook_and_runs_callback() {
    let (template, label) = dref_template().await;
    let exporter = TemplateExporter::new(MemorySink::default(), reqwest::Client::new());
    let calls = AtomicUsize::new(0);

    let report = exporter
        .generate(request(&template, &label), || {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!exporter.is_generating());
    assert!(report.file_name.starts_with("DREF_Application_Response_import_template_"));
    assert!(report.file_name.ends_with(".xlsx"));
    assert!(!report.file_name.contains(' '));
    assert_eq!(report.layout.sheets.len(), 5);
}

#[tokio::test]
async fn test_second_generation_is_rejected_while_first_runs() {
    let (template, label) = dref_template().await;
    let gate = Arc::new(Notify::new());
    let sink = MemorySink {
        gate: Some(gate.clone()),
        ..MemorySink::default()
    };
    let exporter = TemplateExporter::new(sink, reqwest::Client::new());
    let calls = AtomicUsize::new(0);

    let (first, second, ()) = tokio::join!(
        exporter.generate(request(&template, &label), || {
            calls.fetch_add(1, Ordering::SeqCst);
        }),
        exporter.generate(request(&template, &label), || {
            calls.fetch_add(1, Ordering::SeqCst);
        }),
        async {
            tokio::task::yield_now().await;
            gate.notify_one();
        }
    );

    assert!(first.is_ok());
    assert!(second.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!exporter.is_generating());
}

#[tokio::test]
async fn test_failed_logo_still_runs_callback_and_releases_guard() {
    let (template, label) = dref_template().await;
    let exporter = TemplateExporter::new(MemorySink::default(), reqwest::Client::new());
    let calls = AtomicUsize::new(0);

    let mut failing = request(&template, &label);
    failing.logo = LogoSource::File(PathBuf::from("/nonexistent/logo.png"));
    let result = exporter
        .generate(failing, || {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!exporter.is_generating());

    exporter
        .generate(request(&template, &label), || {})
        .await
        .unwrap();
}

#[tokio::test]
async fn test_directory_sink_saves_named_file() {
    let (template, label) = dref_template().await;
    let dir = tempfile::tempdir().unwrap();
    let exporter = TemplateExporter::new(DirectorySink::new(dir.path()), reqwest::Client::new());

    let report = exporter
        .generate(request(&template, &label), || {})
        .await
        .unwrap();

    assert_eq!(report.location, dir.path().join(&report.file_name));
    let bytes = std::fs::read(&report.location).unwrap();
    assert_eq!(bytes.len(), report.size);
    assert_eq!(XLSX_MIME_TYPE, "application/vnd.ms-excel");
}
