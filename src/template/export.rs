//! Template export: render, serialize and hand the file to a download sink.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use super::render::{RenderSettings, TemplateSource, WorkbookLayout, render_template};
use super::warnings::{GenerationWarning, log_warnings};

/// Content type the template is offered as
pub const XLSX_MIME_TYPE: &str = "application/vnd.ms-excel";

const FILE_NAME_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H-%M-%S";

/// `DREF_Application_{label}_import_template_{timestamp}.xlsx` with spaces turned into underscores
pub fn template_file_name(type_label: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "DREF_Application_{}_import_template_{}.xlsx",
        type_label,
        generated_at.format(FILE_NAME_TIMESTAMP_FORMAT)
    )
    .replace(' ', "_")
}

/// Single-flight flag preventing a second generation while one is outstanding
#[derive(Debug, Default)]
pub struct GenerationGuard {
    in_progress: AtomicBool,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard; `None` while another generation holds it
    pub fn try_start(&self) -> Option<GenerationTicket<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationTicket { guard: self })
    }

    pub fn is_generating(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped
#[derive(Debug)]
pub struct GenerationTicket<'a> {
    guard: &'a GenerationGuard,
}

impl Drop for GenerationTicket<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.store(false, Ordering::Release);
    }
}

/// Destination for a finished template file
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` and return where they ended up
    async fn deliver(&self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<PathBuf>;
}

/// Writes templates into a directory, optionally opening them afterwards
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    open_after_save: bool,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            open_after_save: false,
        }
    }

    pub fn open_after_save(mut self, open: bool) -> Self {
        self.open_after_save = open;
        self
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create output directory: {:?}", self.directory))?;

        let path = self.directory.join(file_name);
        debug!("Writing {} bytes ({}) to {:?}", bytes.len(), mime_type, path);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write template file: {:?}", path))?;

        if self.open_after_save {
            try_open_file(&path);
        }
        Ok(path)
    }
}

/// Try to open the saved workbook with a spreadsheet application
pub fn try_open_file(path: &Path) {
    let result = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .arg("/c")
            .arg("start")
            .arg("")
            .arg(path)
            .spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else {
        Command::new("libreoffice")
            .arg("--calc")
            .arg(path)
            .spawn()
            .or_else(|_| Command::new("xdg-open").arg(path).spawn())
    };

    match result {
        Ok(_) => info!("Opened template: {}", path.display()),
        Err(e) => warn!(
            "Could not auto-open file: {}. Please open manually: {}",
            e,
            path.display()
        ),
    }
}

/// Where the cover logo comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogoSource {
    #[default]
    None,
    Bytes(Vec<u8>),
    File(PathBuf),
    Url(String),
}

impl LogoSource {
    /// Interpret a configured value: `http(s)://` means a URL, anything else a file path
    pub fn from_setting(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            LogoSource::Url(value.to_string())
        } else {
            LogoSource::File(PathBuf::from(value))
        }
    }

    pub async fn load(&self, http: &reqwest::Client) -> Result<Option<Vec<u8>>> {
        match self {
            LogoSource::None => Ok(None),
            LogoSource::Bytes(bytes) => Ok(Some(bytes.clone())),
            LogoSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read logo file: {:?}", path))?;
                Ok(Some(bytes))
            }
            LogoSource::Url(url) => {
                debug!("Fetching logo from {}", url);
                let response = http
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch logo from {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Logo request to {} failed", url))?;
                let bytes = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read logo from {}", url))?;
                Ok(Some(bytes.to_vec()))
            }
        }
    }
}

/// One template generation request
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub source: TemplateSource<'a>,
    pub settings: RenderSettings,
    pub logo: LogoSource,
    /// Label of the selected DREF type, embedded in the file name
    pub type_label: String,
}

/// Outcome of a successful generation
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub file_name: String,
    pub location: PathBuf,
    pub size: usize,
    pub layout: WorkbookLayout,
    pub warnings: Vec<GenerationWarning>,
}

pub struct TemplateExporter<S: DownloadSink> {
    sink: S,
    http: reqwest::Client,
    guard: GenerationGuard,
}

impl<S: DownloadSink> TemplateExporter<S> {
    pub fn new(sink: S, http: reqwest::Client) -> Self {
        Self {
            sink,
            http,
            guard: GenerationGuard::new(),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.guard.is_generating()
    }

    /// Generate a template and deliver it.
    ///
    /// `on_complete` runs once the attempt finishes, whether it succeeded or
    /// not; the returned result carries the outcome. A call made while
    /// another generation is running fails immediately and does not invoke
    /// `on_complete`.
    pub async fn generate<F>(&self, request: ExportRequest<'_>, on_complete: F) -> Result<GenerationReport>
    where
        F: FnOnce(),
    {
        let Some(_ticket) = self.guard.try_start() else {
            bail!("A template generation is already in progress");
        };

        let outcome = self.run(request).await;
        on_complete();

        match &outcome {
            Ok(report) => info!(
                "Template {} saved to {} ({} bytes)",
                report.file_name,
                report.location.display(),
                report.size
            ),
            Err(e) => warn!("Template generation failed: {:#}", e),
        }
        outcome
    }

    async fn run(&self, request: ExportRequest<'_>) -> Result<GenerationReport> {
        let generated_at = Local::now();
        let ExportRequest {
            source,
            mut settings,
            logo,
            type_label,
        } = request;

        if settings.logo.is_none() {
            settings.logo = logo.load(&self.http).await?;
        }

        let mut rendered = render_template(source, &settings)?;
        log_warnings(&rendered.warnings);
        let bytes = rendered.to_buffer()?;
        let size = bytes.len();

        let file_name = template_file_name(&type_label, generated_at);
        let location = self
            .sink
            .deliver(&file_name, XLSX_MIME_TYPE, bytes)
            .await
            .with_context(|| format!("Failed to deliver {}", file_name))?;

        Ok(GenerationReport {
            file_name,
            location,
            size,
            layout: rendered.layout,
            warnings: rendered.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_replaces_every_space() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            template_file_name("Imminent Response", at),
            "DREF_Application_Imminent_Response_import_template_05-03-2024_14-07-09.xlsx"
        );
        assert!(!template_file_name("", at).contains(' '));
    }

    #[test]
    fn test_guard_is_single_flight() {
        let guard = GenerationGuard::new();
        let ticket = guard.try_start();
        assert!(ticket.is_some());
        assert!(guard.is_generating());
        assert!(guard.try_start().is_none());

        drop(ticket);
        assert!(!guard.is_generating());
        assert!(guard.try_start().is_some());
    }

    #[test]
    fn test_logo_setting_kinds() {
        assert_eq!(
            LogoSource::from_setting("https://example.org/logo.png"),
            LogoSource::Url("https://example.org/logo.png".into())
        );
        assert_eq!(
            LogoSource::from_setting("assets/logo.png"),
            LogoSource::File(PathBuf::from("assets/logo.png"))
        );
    }

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let path = sink.deliver("a.xlsx", XLSX_MIME_TYPE, vec![1, 2, 3]).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
