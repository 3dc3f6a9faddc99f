use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("failed to run {bin}: {source}")]
    Spawn { bin: String, source: io::Error },
    #[error("{stderr}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("yt-dlp returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid YouTube URL")]
    InvalidUrl,
    #[error("a download is already in progress")]
    Busy,
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no downloaded file found in {}", .0.display())]
    FileNotFound(PathBuf),
}

impl DownloadError {
    pub fn status_message(&self) -> String {
        match self {
            DownloadError::Extractor(err) => format!("下載錯誤: {err}"),
            other => format!("未知錯誤: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusKind;

    #[test]
    fn extractor_failures_read_as_download_errors() {
        let err = DownloadError::from(ExtractorError::Failed {
            code: Some(1),
            stderr: "ERROR: Video unavailable".into(),
        });
        assert_eq!(err.status_message(), "下載錯誤: ERROR: Video unavailable");
        assert_eq!(StatusKind::classify(&err.status_message()), StatusKind::Error);
    }

    #[test]
    fn other_failures_read_as_unknown() {
        let err = DownloadError::FileNotFound(PathBuf::from("/tmp/job"));
        assert!(err.status_message().starts_with("未知錯誤: "));
    }
}
