//! Resilience helpers.
//!
//! Submission itself is never retried. The only repeated call is the
//! confirmation status poll, which is bounded by an attempt budget and an
//! overall timeout and spaced out with `backoff.rs`.

pub mod backoff;
