//! Wall-clock budget for one file's analysis.

use std::time::{Duration, Instant};

use super::FileError;

/// A hard deadline checked before each detector candidate.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    pub fn check(&self) -> Result<(), FileError> {
        if self.expired() {
            return Err(FileError::Timeout {
                millis: self.limit.as_millis(),
            });
        }
        Ok(())
    }
}
