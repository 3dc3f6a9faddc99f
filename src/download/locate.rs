use std::{
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tokio::fs;

/// Finds the file yt-dlp just wrote into `dir`: `<title>.<ext>` if present,
/// otherwise the most recently created file.
pub async fn locate_download(dir: &Path, title: &str) -> io::Result<Option<PathBuf>> {
    let prefix = format!("{title}.");
    let mut named = Vec::new();
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_partial(name) {
            continue;
        }
        if name.starts_with(&prefix) {
            named.push(path.clone());
        }

        // Not every filesystem records a birth time.
        let created = meta.created().or_else(|_| meta.modified())?;
        if newest.as_ref().map_or(true, |(t, _)| created > *t) {
            newest = Some((created, path));
        }
    }

    named.sort();
    Ok(named.into_iter().next().or(newest.map(|(_, p)| p)))
}

fn is_partial(name: &str) -> bool {
    name.ends_with(".part") || name.ends_with(".ytdl") || name.ends_with(".temp")
}
