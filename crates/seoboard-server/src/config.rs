/// Re-export `Config` from `seoboard-core` for use within this crate.
///
/// Environment parsing lives in the core crate so integration tests can build
/// a `Config` without going through the server.
pub use seoboard_core::config::Config;
