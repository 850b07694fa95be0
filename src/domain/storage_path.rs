use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

pub const ARTIFACT_EXTENSION: &str = "webm";

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Name of a stored artifact, relative to the staging store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// Builds `<field_name>-<timestamp>.webm`.
    ///
    /// The timestamp is in microseconds and strictly increasing for the life of
    /// the process, so two calls never return the same name even when the
    /// clock has not ticked between them.
    pub fn generate(field_name: &str) -> Self {
        Self(format!(
            "{}-{}.{}",
            field_name,
            next_stamp(),
            ARTIFACT_EXTENSION
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used for the public artifact URL.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn next_stamp() -> i64 {
    let now = Utc::now().timestamp_micros();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}
