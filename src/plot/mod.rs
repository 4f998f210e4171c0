//! Plot registration and document model
//!
//! The registry maps URL paths to callbacks; each callback builds a
//! [`Document`] on demand when a browser requests that path.

mod document;
mod registry;

pub use document::Document;
pub use registry::{PlotFn, PlotRegistry};
