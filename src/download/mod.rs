mod locate;

pub use locate::locate_download;

use crate::{
    config::AppConfig,
    error::DownloadError,
    extractor::{DownloadJob, Extractor},
    models::{DownloadState, VideoInfo},
    quality::Quality,
    url::{extract_video_id, validate_youtube_url},
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{mpsc, Mutex, RwLock};

#[derive(Clone)]
pub struct Downloader {
    state: Arc<RwLock<DownloadState>>,
    extractor: Arc<dyn Extractor>,
    config: AppConfig,
    job_dir: Arc<Mutex<Option<PathBuf>>>,
}

impl Downloader {
    pub fn new(config: AppConfig, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            state: Arc::new(RwLock::new(DownloadState::default())),
            extractor,
            config,
            job_dir: Arc::new(Mutex::new(None)),
        }
    }

    pub fn validate_url(&self, url: &str) -> bool {
        validate_youtube_url(url)
    }

    pub async fn video_info(&self, url: &str) -> Option<VideoInfo> {
        match self.extractor.fetch_info(url).await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!(%url, "failed to fetch video info: {err}");
                None
            }
        }
    }

    pub async fn status(&self) -> DownloadState {
        self.state.read().await.clone()
    }

    pub async fn downloaded_file(&self) -> Option<PathBuf> {
        self.state.read().await.downloaded_file.clone()
    }

    /// Clears progress and the finished file. An idle job's temp dir goes with it.
    pub async fn reset(&self) {
        // Held across the idle check so a concurrent start cannot swap in its dir.
        let mut job_dir = self.job_dir.lock().await;
        let idle = {
            let mut state = self.state.write().await;
            state.reset();
            !state.is_downloading
        };
        if idle {
            if let Some(dir) = job_dir.take() {
                remove_job_dir(&dir).await;
            }
        }
    }

    /// Starts a background download into a fresh temp dir and returns that dir.
    pub async fn start(&self, url: String, quality: Quality) -> Result<PathBuf, DownloadError> {
        if !self.validate_url(&url) {
            return Err(DownloadError::InvalidUrl);
        }
        self.try_begin().await?;

        let dir = match tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .tempdir()
        {
            Ok(dir) => dir.keep(),
            Err(err) => {
                let err = DownloadError::from(err);
                self.state.write().await.fail(err.status_message());
                return Err(err);
            }
        };

        if let Some(previous) = self.job_dir.lock().await.replace(dir.clone()) {
            remove_job_dir(&previous).await;
        }

        tracing::info!(
            video_id = %extract_video_id(&url).unwrap_or_default(),
            %quality,
            dir = %dir.display(),
            "download started"
        );

        let this = self.clone();
        let job_dir = dir.clone();
        tokio::spawn(async move {
            let _ = this.execute(&url, &quality, &job_dir).await;
        });

        Ok(dir)
    }

    pub async fn download_to(
        &self,
        url: &str,
        quality: &Quality,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        if !self.validate_url(url) {
            return Err(DownloadError::InvalidUrl);
        }
        self.try_begin().await?;
        if let Err(err) = tokio::fs::create_dir_all(output_dir).await {
            let err = DownloadError::from(err);
            self.state.write().await.fail(err.status_message());
            return Err(err);
        }
        self.execute(url, quality, output_dir).await
    }

    async fn try_begin(&self) -> Result<(), DownloadError> {
        let mut state = self.state.write().await;
        if state.is_downloading {
            return Err(DownloadError::Busy);
        }
        state.begin();
        Ok(())
    }

    async fn execute(
        &self,
        url: &str,
        quality: &Quality,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        match self.transfer(url, quality, output_dir).await {
            Ok(file) => {
                tracing::info!(file = %file.display(), "download finished");
                self.state.write().await.finish(file.clone());
                Ok(file)
            }
            Err(err) => {
                match &err {
                    DownloadError::Extractor(_) => tracing::warn!(%url, "download failed: {err}"),
                    other => tracing::error!(%url, error = ?other, "download failed unexpectedly"),
                }
                self.state.write().await.fail(err.status_message());
                Err(err)
            }
        }
    }

    async fn transfer(
        &self,
        url: &str,
        quality: &Quality,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let info = self.extractor.fetch_info(url).await?;
        let job = DownloadJob::new(url, quality.format_selector(), output_dir);
        tracing::debug!(title = %info.title, format = %job.format, "running extractor");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let state = self.state.clone();
        let updater = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                state.write().await.apply(&event);
            }
        });

        let result = self.extractor.download(&job, tx).await;
        let _ = updater.await;
        result?;

        locate_download(output_dir, &info.title)
            .await?
            .ok_or_else(|| DownloadError::FileNotFound(output_dir.to_path_buf()))
    }
}

async fn remove_job_dir(dir: &Path) {
    if let Err(err) = tokio::fs::remove_dir_all(dir).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(dir = %dir.display(), "failed to remove job dir: {err}");
        }
    }
}
