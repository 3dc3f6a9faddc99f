use crate::config::{resolve_port, AppConfig, Platform};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "YouTube downloader: web page and CLI over yt-dlp")]
pub struct Cli {
    /// yt-dlp executable to drive
    #[arg(long, global = true, env = "YTGRAB_YTDLP", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web page and HTTP API
    Serve {
        /// Hosting platform, decides the fallback port
        #[arg(long, value_enum, default_value_t = Platform::Local)]
        platform: Platform,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Raw port value; non-numeric or out of range falls back to the platform default
        #[arg(long, env = "PORT")]
        port: Option<String>,
    },
    /// Print title, uploader, duration and formats of a video
    Info { url: String },
    /// Download one video in the foreground
    Download {
        url: String,
        #[arg(short, long, default_value = "720p")]
        quality: String,
        /// Target folder, defaults to the Downloads subfolder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig {
            ytdlp_bin: self.yt_dlp.clone(),
            ..AppConfig::default()
        };
        match &self.command {
            Command::Serve {
                platform,
                host,
                port,
            } => {
                config.bind_host = host.clone();
                config.port = resolve_port(port.as_deref(), *platform);
            }
            Command::Download {
                output: Some(output),
                ..
            } => config.save_dir = output.clone(),
            _ => {}
        }
        config
    }
}
