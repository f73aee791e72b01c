//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a client is open.
//!
//! # Tasks
//! - Refresh: re-fetches every cached key at the configured interval

mod refresh;

pub use refresh::{run_refresh_cycle, RefreshScheduler, RefreshSummary};
