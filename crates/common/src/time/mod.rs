//! Time abstractions
//!
//! Components that reason about elapsed time (cache expiry) read it through
//! [`Clock`] so tests can drive time forward without sleeping.

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
