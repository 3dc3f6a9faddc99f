use once_cell::sync::Lazy;
use regex::Regex;

// Permissive on purpose: it only gates obviously wrong input before yt-dlp
// gets a chance to reject the link itself.
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})",
    )
    .expect("valid youtube url pattern")
});

pub fn validate_youtube_url(url: &str) -> bool {
    YOUTUBE_URL.is_match(url)
}

pub fn extract_video_id(url: &str) -> Option<String> {
    YOUTUBE_URL
        .captures(url)
        .and_then(|caps| caps.get(6))
        .map(|m| m.as_str().to_string())
}
