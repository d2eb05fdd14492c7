//! Authentication domain
//!
//! The failure taxonomy shared by every authentication operation and the
//! clock abstraction used for session timestamps.

mod clock;
mod error;

pub use clock::{Clock, SystemClock};
pub use error::AuthError;

#[cfg(test)]
pub use clock::MockClock;
