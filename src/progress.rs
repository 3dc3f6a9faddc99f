use crate::models::{DownloadState, STATUS_COMPLETE};

pub const LINE_TAG: &str = "ytgrab";

/// Passed to `--progress-template`; yielding `ytgrab|status|downloaded|total|estimate`.
pub const PROGRESS_TEMPLATE: &str = "download:ytgrab|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s";

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Downloading,
    Finished,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub downloaded_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
}

impl ProgressEvent {
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.trim().split('|');
        if fields.next()? != LINE_TAG {
            return None;
        }
        let phase = match fields.next()? {
            "downloading" => Phase::Downloading,
            "finished" => Phase::Finished,
            other => Phase::Other(other.to_string()),
        };
        Some(Self {
            phase,
            downloaded_bytes: fields.next().and_then(parse_count),
            total_bytes: fields.next().and_then(parse_count),
            total_bytes_estimate: fields.next().and_then(parse_count),
        })
    }

    /// Percentage from the exact total if known, else from the estimate.
    pub fn percent(&self) -> Option<f64> {
        let downloaded = self.downloaded_bytes?;
        let total = self
            .total_bytes
            .filter(|t| *t > 0.0)
            .or(self.total_bytes_estimate.filter(|t| *t > 0.0))?;
        Some((downloaded / total * 100.0).clamp(0.0, 100.0))
    }
}

// yt-dlp prints `NA` for fields it does not know.
fn parse_count(raw: &str) -> Option<f64> {
    match raw.trim() {
        "" | "NA" | "None" => None,
        value => value.parse::<f64>().ok(),
    }
}

impl DownloadState {
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event.phase {
            Phase::Downloading => {
                if let Some(pct) = event.percent() {
                    self.progress = pct;
                }
                self.status = format!("下載中... {:.1}%", self.progress);
            }
            Phase::Finished => {
                self.progress = 100.0;
                self.status = STATUS_COMPLETE.to_string();
            }
            Phase::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_downloading_line() {
        let event = ProgressEvent::parse_line("ytgrab|downloading|512|2048|NA").unwrap();
        assert_eq!(event.phase, Phase::Downloading);
        assert_eq!(event.percent(), Some(25.0));
    }

    #[test]
    fn falls_back_to_estimate() {
        let event = ProgressEvent::parse_line("ytgrab|downloading|300|NA|1200.0").unwrap();
        assert_eq!(event.total_bytes, None);
        assert_eq!(event.percent(), Some(25.0));
    }

    #[test]
    fn unknown_totals_leave_progress_unspecified() {
        let event = ProgressEvent::parse_line("ytgrab|downloading|300|NA|NA").unwrap();
        assert_eq!(event.percent(), None);
        let zero = ProgressEvent::parse_line("ytgrab|downloading|300|0|NA").unwrap();
        assert_eq!(zero.percent(), None);
    }

    #[test]
    fn overshoot_is_capped_at_full() {
        let event = ProgressEvent::parse_line("ytgrab|downloading|300|100|NA").unwrap();
        assert_eq!(event.percent(), Some(100.0));

        let mut state = DownloadState::default();
        state.begin();
        state.apply(&event);
        assert_eq!(state.progress, 100.0);
        assert_eq!(state.status, "下載中... 100.0%");
    }

    #[test]
    fn ignores_foreign_lines() {
        assert!(ProgressEvent::parse_line("[youtube] dQw4w9WgXcQ: Downloading webpage").is_none());
        assert!(ProgressEvent::parse_line("").is_none());
    }

    #[test]
    fn apply_tracks_progress_and_completion() {
        let mut state = DownloadState::default();
        state.begin();

        state.apply(&ProgressEvent::parse_line("ytgrab|downloading|1|4|NA").unwrap());
        assert_eq!(state.progress, 25.0);
        assert_eq!(state.status, "下載中... 25.0%");

        state.apply(&ProgressEvent::parse_line("ytgrab|downloading|2|NA|NA").unwrap());
        assert_eq!(state.progress, 25.0);

        state.apply(&ProgressEvent::parse_line("ytgrab|finished|4|4|NA").unwrap());
        assert_eq!(state.progress, 100.0);
        assert_eq!(state.status, STATUS_COMPLETE);
        assert!(state.is_downloading);
    }
}
