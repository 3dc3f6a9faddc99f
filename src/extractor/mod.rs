use crate::{
    error::ExtractorError,
    models::VideoInfo,
    progress::{ProgressEvent, PROGRESS_TEMPLATE},
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};

#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub format: String,
    pub output_template: String,
}

impl DownloadJob {
    pub fn new(url: impl Into<String>, format: impl Into<String>, output_dir: &Path) -> Self {
        Self {
            url: url.into(),
            format: format.into(),
            output_template: output_dir
                .join("%(title)s.%(ext)s")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ExtractorError>;

    /// Runs the transfer, sending one event per progress report.
    async fn download(
        &self,
        job: &DownloadJob,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> Result<(), ExtractorError>;
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    bin: PathBuf,
}

impl YtDlp {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.kill_on_drop(true).stdin(Stdio::null());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ExtractorError {
        ExtractorError::Spawn {
            bin: self.bin.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ExtractorError> {
        tracing::debug!(%url, "fetching metadata");
        let output = self
            .command()
            .args([
                "--dump-single-json",
                "--no-warnings",
                "--no-playlist",
                "--skip-download",
                url,
            ])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ExtractorError::Failed {
                code: output.status.code(),
                stderr: summarize_stderr(&String::from_utf8_lossy(&output.stderr)),
            });
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    async fn download(
        &self,
        job: &DownloadJob,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> Result<(), ExtractorError> {
        let mut child = self
            .command()
            .args([
                "-f",
                job.format.as_str(),
                "-o",
                job.output_template.as_str(),
                "--no-playlist",
                "--no-warnings",
                "--newline",
                "--progress-template",
                PROGRESS_TEMPLATE,
                job.url.as_str(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ExtractorError::Io(std::io::Error::other("yt-dlp stdout not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ExtractorError::Io(std::io::Error::other("yt-dlp stderr not captured"))
        })?;

        let stderr_reader = tokio::spawn(drain_lossy(stderr));

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match ProgressEvent::parse_line(&line) {
                Some(event) => {
                    let _ = progress_tx.send(event);
                }
                None => tracing::debug!(target: "yt-dlp", "{line}"),
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_reader.await.unwrap_or_default();
        if !status.success() {
            return Err(ExtractorError::Failed {
                code: status.code(),
                stderr: summarize_stderr(&stderr),
            });
        }
        Ok(())
    }
}

// Titles in yt-dlp messages are not always valid UTF-8 on every platform.
async fn drain_lossy<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Keeps the `ERROR:` lines of yt-dlp's stderr, or all of it when there are none.
pub fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR"))
        .collect();
    if errors.is_empty() {
        stderr.trim().to_string()
    } else {
        errors.join("\n")
    }
}
