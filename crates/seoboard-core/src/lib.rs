//! Report aggregation engine for the SEO dashboard.
//!
//! Everything here is pure and synchronous. Callers pass in rows they
//! already fetched and get serializable records back; nothing is cached
//! between calls.

pub mod backlinks;
pub mod config;
pub mod date_range;
pub mod delta;
pub mod directory;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod pager;
pub mod ranking;
pub mod rollup;
pub mod snapshot;

pub use error::{CoreError, Result};
