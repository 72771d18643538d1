//! Normalized job descriptor and the legacy entry encodings it is parsed from.
//!
//! Job-store entries are positional JSON values:
//!
//! | shape                               | meaning                              |
//! |-------------------------------------|--------------------------------------|
//! | `"url"` / `["url"]`                 | whole recording                      |
//! | `["url", n]`                        | sample count (n > 0) or resume (-n)  |
//! | `["url", start, end, total]`        | time range, times as `[[h:]m:]s`     |
//! | `["url", start, end, total, n]`     | both                                 |
//!
//! The sign overload of `n` is resolved here and nowhere else.

use serde_json::Value;

use crate::mux::{Checkpoint, RangeSpec, SampleSpec};

/// Malformed job-store entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobEntryError {
    #[error("entry must be a url string or an array")]
    WrongType,
    #[error("entry array is empty")]
    Empty,
    #[error("first element of the entry is not a url string")]
    NotAUrl,
    #[error("url is empty")]
    EmptyUrl,
    #[error("entry array has {0} elements (expected 1, 2, 4 or 5)")]
    BadLength(usize),
    #[error("bad time `{0}` (expected [[h:]m:]s)")]
    BadTime(String),
    #[error("total duration must be greater than zero")]
    ZeroTotal,
    #[error("sample/resume value must be an integer, got {0}")]
    BadCount(String),
}

/// One job: which recording, which part of it, and where to resume.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    /// Position of the entry in the job store.
    pub slot: usize,
    pub url: String,
    pub range: Option<RangeSpec>,
    pub sample_count: Option<u32>,
    pub resume_index: Option<usize>,
}

impl JobSpec {
    pub fn new(slot: usize, url: impl Into<String>) -> Self {
        Self {
            slot,
            url: url.into(),
            range: None,
            sample_count: None,
            resume_index: None,
        }
    }

    pub fn range(&self) -> RangeSpec {
        self.range.unwrap_or_default()
    }

    pub fn sample(&self) -> SampleSpec {
        self.sample_count.map_or_else(SampleSpec::none, SampleSpec::new)
    }

    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.resume_index.map(Checkpoint::new)
    }

    /// Parse one legacy entry found at `slot`.
    pub fn from_entry(slot: usize, entry: &Value) -> Result<Self, JobEntryError> {
        let (url, rest) = match entry {
            Value::String(url) => (url.as_str(), &[][..]),
            Value::Array(items) => {
                let (first, rest) = items.split_first().ok_or(JobEntryError::Empty)?;
                (first.as_str().ok_or(JobEntryError::NotAUrl)?, rest)
            }
            _ => return Err(JobEntryError::WrongType),
        };
        let url = url.trim();
        if url.is_empty() {
            return Err(JobEntryError::EmptyUrl);
        }

        let mut job = JobSpec::new(slot, url);
        let count = match rest {
            [] => None,
            [n] => Some(n),
            [start, end, total] => {
                job.range = Some(range_from_times(start, end, total)?);
                None
            }
            [start, end, total, n] => {
                job.range = Some(range_from_times(start, end, total)?);
                Some(n)
            }
            _ => return Err(JobEntryError::BadLength(rest.len() + 1)),
        };
        if let Some(n) = count {
            let n = integer(n)?;
            if n > 0 {
                job.sample_count = Some(u32::try_from(n).unwrap_or(u32::MAX));
            } else if n < 0 {
                job.resume_index = Some(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX));
            }
        }
        Ok(job)
    }
}

fn integer(v: &Value) -> Result<i64, JobEntryError> {
    if let Some(n) = v.as_i64() {
        return Ok(n);
    }
    match v.as_f64() {
        Some(f) if f.is_finite() => Ok(f.trunc() as i64),
        _ => Err(JobEntryError::BadCount(v.to_string())),
    }
}

/// Seconds in a `[[h:]m:]s` string.
pub fn parse_timestamp(s: &str) -> Result<u64, JobEntryError> {
    let bad = || JobEntryError::BadTime(s.to_string());
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() > 3 {
        return Err(bad());
    }
    parts.iter().try_fold(0u64, |acc, p| {
        let v: u64 = p.trim().parse().map_err(|_| bad())?;
        Ok(acc * 60 + v)
    })
}

fn range_from_times(start: &Value, end: &Value, total: &Value) -> Result<RangeSpec, JobEntryError> {
    let secs = |v: &Value| match v.as_str() {
        Some(s) => parse_timestamp(s),
        None => Err(JobEntryError::BadTime(v.to_string())),
    };
    let (start, end, total) = (secs(start)?, secs(end)?, secs(total)?);
    if total == 0 {
        return Err(JobEntryError::ZeroTotal);
    }
    let total = total as f64;
    Ok(RangeSpec::new(
        start as f64 / total * 100.0,
        end as f64 / total * 100.0,
    ))
}

/// Write a resume index back into `entry`, keeping its shape: a bare string
/// becomes `[url, -i]`, 1- and 4-element arrays gain a trailing `-i`, 2- and
/// 5-element arrays have it replaced. Index 0 is stored as `0` (no resume).
pub fn encode_checkpoint(entry: &Value, index: usize) -> Result<Value, JobEntryError> {
    let encoded = Value::from(-(i64::try_from(index).unwrap_or(i64::MAX)));
    match entry {
        Value::String(url) => Ok(Value::Array(vec![Value::String(url.clone()), encoded])),
        Value::Array(items) => {
            let mut items = items.clone();
            match items.len() {
                0 => return Err(JobEntryError::Empty),
                1 | 4 => items.push(encoded),
                2 | 5 => {
                    if let Some(last) = items.last_mut() {
                        *last = encoded;
                    }
                }
                n => return Err(JobEntryError::BadLength(n)),
            }
            Ok(Value::Array(items))
        }
        _ => Err(JobEntryError::WrongType),
    }
}
