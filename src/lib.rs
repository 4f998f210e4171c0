//! plotbridge
//!
//! Embeds a plot server in an autonomous-agent process. The agent registers
//! plot-producing callbacks under URL paths, starts the server on a
//! background thread, and serves pages from its own web endpoint that embed
//! the script markup handed back by the adapter.
//!
//! ```no_run
//! use plotbridge::{PlotServer, PlotServerConfig};
//!
//! let server = PlotServer::new();
//! server.add_plot("/my_plot", |doc| {
//!     doc.set_title("Sea Surface Temperature");
//! });
//! let _port = server.start(PlotServerConfig::default())?;
//! let script = server.plot_script("/my_plot")?;
//! # let _ = script;
//! # Ok::<(), plotbridge::ServerError>(())
//! ```

pub mod agent;
pub mod embed;
pub mod plot;
pub mod server;

pub use agent::PlotHost;
pub use plot::{Document, PlotFn, PlotRegistry};
pub use server::{PlotServer, PlotServerConfig, ServerError};
