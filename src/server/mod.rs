//! Plot server module
//!
//! Hosts registered plot applications on a background thread and hands out
//! the embed markup that references them.

mod adapter;
mod app;

pub use adapter::{PlotServer, PlotServerConfig, ServerError, DEFAULT_PORT};
