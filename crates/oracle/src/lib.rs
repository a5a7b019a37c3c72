//! Oracle transport: the chat-completions client used to pick among
//! ambiguous HS code candidates.
//!
//! Blocking reqwest (no Tokio runtime). Exactly one request per call; the
//! resolver handles every failure by falling back, so there are no retries.

mod client;

pub use client::{oracle_from_config, OracleClient};
