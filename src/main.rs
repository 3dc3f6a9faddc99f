use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::Path, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;
use ytgrab::{
    api, cli,
    download::Downloader,
    extractor::YtDlp,
    models::{StatusKind, MSG_INVALID_URL},
    quality::Quality,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Cli::parse_args();
    let config = args.config();
    let extractor = Arc::new(YtDlp::new(config.ytdlp_bin.clone()));
    let downloader = Downloader::new(config.clone(), extractor);

    match args.command {
        cli::Command::Serve { .. } => {
            api::serve(config.bind_addr(), downloader).await?;
        }
        cli::Command::Info { url } => {
            if !downloader.validate_url(&url) {
                bail!(MSG_INVALID_URL);
            }
            match downloader.video_info(&url).await {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => bail!("video info unavailable for {url}"),
            }
        }
        cli::Command::Download { url, quality, .. } => {
            let quality = Quality::parse(&quality);
            download_with_progress(&downloader, &url, &quality, &config.save_dir).await?;
        }
    }

    Ok(())
}

async fn download_with_progress(
    downloader: &Downloader,
    url: &str,
    quality: &Quality,
    save_dir: &Path,
) -> Result<()> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.red/white} {pos:>3}% {msg}")?.progress_chars("█▉ "),
    );

    let job = {
        let downloader = downloader.clone();
        let (url, quality, save_dir) = (url.to_string(), quality.clone(), save_dir.to_path_buf());
        tokio::spawn(async move { downloader.download_to(&url, &quality, &save_dir).await })
    };

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    while !job.is_finished() {
        ticker.tick().await;
        let state = downloader.status().await;
        bar.set_position(state.progress.round() as u64);
        bar.set_message(state.status);
    }

    let state = downloader.status().await;
    match job.await? {
        Ok(file) => {
            bar.finish_with_message(state.status);
            println!("{}", file.display());
            Ok(())
        }
        Err(err) => {
            bar.abandon_with_message(match state.kind() {
                StatusKind::Idle => err.to_string(),
                _ => state.status,
            });
            Err(err.into())
        }
    }
}
