//! Time source for token issuance and expiry checks

use std::fmt::Debug;

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
