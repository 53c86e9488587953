pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod routes;
pub mod sequencer;
pub mod state;
pub mod upstream;
