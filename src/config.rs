use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    #[default]
    Local,
    Render,
    Railway,
}

impl Platform {
    pub fn default_port(self) -> u16 {
        match self {
            Platform::Local => 5000,
            Platform::Render => 10000,
            Platform::Railway => 8080,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    pub ytdlp_bin: PathBuf,
    pub temp_prefix: String,
    pub save_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: Platform::Local.default_port(),
            ytdlp_bin: PathBuf::from("yt-dlp"),
            temp_prefix: "ytgrab-".to_string(),
            save_dir: default_save_dir(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Resolves the listening port from a raw `PORT` value. Anything that is not a
/// number in 1..=65535 falls back to the platform default.
pub fn resolve_port(raw: Option<&str>, platform: Platform) -> u16 {
    match raw.map(str::trim).map(str::parse::<u32>) {
        Some(Ok(port)) if (1..=65535).contains(&port) => port as u16,
        Some(_) => {
            tracing::warn!(
                "ignoring invalid PORT {:?}, using {}",
                raw.unwrap_or_default(),
                platform.default_port()
            );
            platform.default_port()
        }
        None => platform.default_port(),
    }
}

/// `<Downloads>/YouTube Downloads`, or the working directory when the platform
/// has no Downloads folder.
pub fn default_save_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("YouTube Downloads")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_follow_platform() {
        assert_eq!(resolve_port(None, Platform::Local), 5000);
        assert_eq!(resolve_port(None, Platform::Render), 10000);
        assert_eq!(resolve_port(None, Platform::Railway), 8080);
    }

    #[test]
    fn valid_port_is_used() {
        assert_eq!(resolve_port(Some("3000"), Platform::Railway), 3000);
        assert_eq!(resolve_port(Some(" 65535 "), Platform::Local), 65535);
    }

    #[test]
    fn invalid_port_falls_back() {
        assert_eq!(resolve_port(Some("0"), Platform::Railway), 8080);
        assert_eq!(resolve_port(Some("70000"), Platform::Railway), 8080);
        assert_eq!(resolve_port(Some("$PORT"), Platform::Render), 10000);
        assert_eq!(resolve_port(Some(""), Platform::Local), 5000);
    }

    #[test]
    fn save_dir_ends_with_subfolder() {
        assert!(default_save_dir().ends_with("YouTube Downloads"));
    }
}
