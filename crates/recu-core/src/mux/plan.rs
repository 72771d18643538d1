//! Which segment indices a mux run visits.

/// Stride switches from "every n-th segment" to "n evenly spread segments"
/// above this sample count.
const SPREAD_THRESHOLD: usize = 10;

/// Portion of the recording to keep, in percent of the segment count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub start_percent: f64,
    pub end_percent: f64,
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self::full()
    }
}

impl RangeSpec {
    pub fn full() -> Self {
        Self {
            start_percent: 0.0,
            end_percent: 100.0,
        }
    }

    pub fn new(start_percent: f64, end_percent: f64) -> Self {
        Self {
            start_percent,
            end_percent,
        }
    }

    /// Clamped to [0, 100]; `None` when nothing is left (`end <= start`,
    /// `start > 100` or non-finite bounds).
    pub fn clamped(&self) -> Option<(f64, f64)> {
        if !self.start_percent.is_finite() || !self.end_percent.is_finite() {
            return None;
        }
        if self.start_percent > 100.0 || self.end_percent <= self.start_percent {
            return None;
        }
        Some((self.start_percent.max(0.0), self.end_percent.min(100.0)))
    }
}

/// Preview sampling request: keep roughly every n-th segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleSpec {
    pub requested_count: u32,
}

impl SampleSpec {
    /// No sampling: every segment in range.
    pub fn none() -> Self {
        Self { requested_count: 1 }
    }

    pub fn new(requested_count: u32) -> Self {
        Self { requested_count }
    }

    /// Effective odd count >= 1 for a manifest of `segment_count` segments.
    /// Zero or more than half the segments disables sampling.
    pub fn effective(&self, segment_count: usize) -> usize {
        let mut n = self.requested_count as usize;
        if n == 0 || n > segment_count / 2 {
            n = 1;
        }
        if n % 2 == 0 {
            n -= 1;
        }
        n
    }
}

/// Absolute segment index a previous run stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub segment_index: usize,
}

impl Checkpoint {
    pub fn new(segment_index: usize) -> Self {
        Self { segment_index }
    }
}

/// Visit plan: indices `start, start + stride, ...` while `< stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxPlan {
    pub start: usize,
    pub stop: usize,
    pub stride: usize,
    pub resume: bool,
}

impl MuxPlan {
    /// `None` when the range is empty (a no-op run).
    pub fn new(
        segment_count: usize,
        range: RangeSpec,
        sample: SampleSpec,
        checkpoint: Option<Checkpoint>,
    ) -> Option<Self> {
        let (start_pct, end_pct) = range.clamped()?;
        let n = segment_count as f64;
        let stop = ((n * end_pct / 100.0).floor() as usize).min(segment_count);
        let (start, count, resume) = match checkpoint {
            Some(cp) if cp.segment_index > 0 => (cp.segment_index, 1, true),
            _ => (
                (n * start_pct / 100.0).floor() as usize,
                sample.effective(segment_count),
                false,
            ),
        };
        let stride = if count > SPREAD_THRESHOLD {
            segment_count.div_ceil(count)
        } else {
            count
        };
        Some(Self {
            start,
            stop,
            stride: stride.max(1),
            resume,
        })
    }

    /// Visits left from `index` (inclusive) to the stop index.
    pub fn remaining_from(&self, index: usize) -> usize {
        self.stop.saturating_sub(index).div_ceil(self.stride)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.stride)
    }
}
