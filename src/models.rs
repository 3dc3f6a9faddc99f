use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const STATUS_PREPARING: &str = "準備下載...";
pub const STATUS_COMPLETE: &str = "下載完成！";
pub const STATUS_STARTED: &str = "下載已開始";
pub const MSG_INVALID_URL: &str = "無效的YouTube連結格式";
pub const MSG_BUSY: &str = "已有下載任務進行中";
pub const MSG_FILE_MISSING: &str = "檔案不存在";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_quality")]
    pub quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub url: String,
}

fn default_quality() -> String {
    crate::quality::Quality::default().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVideoInfo")]
pub struct VideoInfo {
    pub title: String,
    pub duration: u64,
    pub uploader: String,
    pub view_count: u64,
    pub thumbnail: String,
    pub formats: Vec<Format>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

// yt-dlp emits explicit nulls for unknown fields, so every field goes through
// Option before the defaults are substituted.
#[derive(Deserialize)]
struct RawVideoInfo {
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    view_count: Option<u64>,
    thumbnail: Option<String>,
    formats: Option<Vec<Format>>,
}

impl From<RawVideoInfo> for VideoInfo {
    fn from(raw: RawVideoInfo) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| "Unknown".to_string()),
            duration: raw.duration.map(|d| d.max(0.0).round() as u64).unwrap_or(0),
            uploader: raw.uploader.unwrap_or_else(|| "Unknown".to_string()),
            view_count: raw.view_count.unwrap_or(0),
            thumbnail: raw.thumbnail.unwrap_or_default(),
            formats: raw.formats.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadState {
    pub is_downloading: bool,
    pub progress: f64,
    pub status: String,
    pub downloaded_file: Option<PathBuf>,
}

impl DownloadState {
    pub fn begin(&mut self) {
        self.is_downloading = true;
        self.progress = 0.0;
        self.status = STATUS_PREPARING.to_string();
        self.downloaded_file = None;
    }

    pub fn finish(&mut self, file: PathBuf) {
        self.is_downloading = false;
        self.progress = 100.0;
        self.status = STATUS_COMPLETE.to_string();
        self.downloaded_file = Some(file);
    }

    pub fn fail(&mut self, status: String) {
        self.is_downloading = false;
        self.status = status;
    }

    /// Clears the user-visible fields. The busy flag belongs to the running job.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.status.clear();
        self.downloaded_file = None;
    }

    pub fn kind(&self) -> StatusKind {
        StatusKind::classify(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Idle,
    Active,
    Completed,
    Error,
    Failed,
    Stopped,
}

impl StatusKind {
    pub fn classify(status: &str) -> Self {
        if status.is_empty() {
            StatusKind::Idle
        } else if status.contains("完成") {
            StatusKind::Completed
        } else if status.contains("錯誤") {
            StatusKind::Error
        } else if status.contains("失敗") {
            StatusKind::Failed
        } else if status.contains("停止") {
            StatusKind::Stopped
        } else {
            StatusKind::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_strings() {
        let cases = [
            ("", StatusKind::Idle),
            ("準備下載...", StatusKind::Active),
            ("下載中... 42.0%", StatusKind::Active),
            ("下載完成！", StatusKind::Completed),
            ("下載錯誤: HTTP Error 403", StatusKind::Error),
            ("未知錯誤: disk full", StatusKind::Error),
            ("獲取影片資訊失敗", StatusKind::Failed),
            ("下載已停止", StatusKind::Stopped),
        ];
        for (status, expected) in cases {
            assert_eq!(StatusKind::classify(status), expected, "{status}");
        }
    }

    #[test]
    fn video_info_substitutes_defaults() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": null, "duration": 212.4, "thumbnail": "https://i.ytimg.com/x.jpg"}"#,
        )
        .unwrap();
        assert_eq!(info.title, "Unknown");
        assert_eq!(info.uploader, "Unknown");
        assert_eq!(info.duration, 212);
        assert_eq!(info.view_count, 0);
        assert!(info.formats.is_empty());
    }

    #[test]
    fn video_info_keeps_formats() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": "Clip", "formats": [
                {"format_id": "18", "ext": "mp4", "height": 360, "filesize": null, "tbr": 500.1},
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[0].height, Some(360));
        assert_eq!(info.formats[1].vcodec.as_deref(), Some("none"));
    }

    #[test]
    fn reset_keeps_busy_flag() {
        let mut state = DownloadState::default();
        state.begin();
        state.progress = 50.0;
        state.reset();
        assert!(state.is_downloading);
        assert_eq!(state.progress, 0.0);
        assert!(state.status.is_empty());
    }

    #[test]
    fn request_defaults_quality() {
        let req: DownloadRequest = serde_json::from_str(r#"{"url": "x"}"#).unwrap();
        assert_eq!(req.quality, "720p");
    }
}
