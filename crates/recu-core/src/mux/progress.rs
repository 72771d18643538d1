//! Per-segment progress snapshots (percent, ETA, speed).
//!
//! Speed and ETA are smoothed over the last segments with
//! [`RollingAverage`](crate::rolling::RollingAverage): speed = mean size /
//! mean duration, ETA = mean duration x visits left.

/// Snapshot emitted after every written segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Job-store slot of the job, when run by the orchestrator.
    pub slot: Option<usize>,
    pub basename: String,
    /// Absolute index of the segment just written.
    pub index: usize,
    pub segment_count: usize,
    /// `index / segment_count` in percent.
    pub percent: f64,
    pub eta_secs: f64,
    pub bytes_per_sec: f64,
    /// Bytes written by this run so far.
    pub bytes_written: u64,
}

impl ProgressStats {
    pub fn eta(&self) -> String {
        format_eta(self.eta_secs)
    }

    pub fn rate(&self) -> String {
        format_rate(self.bytes_per_sec)
    }
}

/// Human duration: seconds below a minute, then minutes, hours, days.
pub fn format_eta(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "?".to_string();
    }
    let mins = secs / 60.0;
    if mins < 1.0 {
        format!("{:.1} secs", secs)
    } else if mins > 1440.0 {
        format!("{:.1} days", mins / 1440.0)
    } else if mins > 60.0 {
        format!("{:.1} hours", mins / 60.0)
    } else {
        format!("{:.1} mins", mins)
    }
}

/// Human throughput in decimal units (B/s, KB/s, MB/s).
pub fn format_rate(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec < 0.0 {
        return "? B/s".to_string();
    }
    if bytes_per_sec >= 1_000_000.0 {
        format!("{:.1} MB/s", bytes_per_sec / 1_000_000.0)
    } else if bytes_per_sec >= 1000.0 {
        format!("{:.1} KB/s", bytes_per_sec / 1000.0)
    } else {
        format!("{:.1} B/s", bytes_per_sec)
    }
}
