//! Plot server lifecycle
//!
//! [`PlotServer`] owns a single background worker thread that hosts the plot
//! application. The worker runs its own tokio runtime, isolated from any
//! runtime the host agent uses for its own I/O. `start` waits for the worker
//! to confirm the bind, so `is_running() == true` means the socket is
//! actually accepting connections.

use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime;
use tokio::sync::watch;
use tracing::{error, info};

use super::app::build_router;
use crate::embed;
use crate::plot::{Document, PlotRegistry};

/// How long `start` waits for the worker to report its bind result.
const BIND_WAIT: Duration = Duration::from_secs(5);

/// Default listen port for the plot server.
pub const DEFAULT_PORT: u16 = 5006;

/// Configuration for the plot server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotServerConfig {
    /// Hostname to bind to. Must be reachable from the browsers that will
    /// load the embed script.
    pub hostname: String,
    /// Port to listen on. Port 0 binds an ephemeral port; the bound port is
    /// returned by [`PlotServer::start`].
    pub port: u16,
}

impl PlotServerConfig {
    /// Create a new configuration.
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    /// Get the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

impl Default for PlotServerConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

/// Errors that can occur during plot server lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Plot server is already running")]
    AlreadyRunning,

    #[error("Plot server has not been started")]
    NotStarted,

    #[error("Failed to bind plot server socket: {0}")]
    Bind(std::io::Error),

    #[error("Failed to launch plot server worker: {0}")]
    Spawn(std::io::Error),

    #[error("Plot server worker exited before reporting its bind result")]
    WorkerGone,
}

/// Lifecycle state guarded by the adapter's mutex.
#[derive(Default)]
struct ServerState {
    hostname: Option<String>,
    port: Option<u16>,
    running: bool,
    shutdown: Option<watch::Sender<bool>>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Hosts registered plots on a background thread and hands out the embed
/// markup that references them.
///
/// Plots must be registered before `start`; the worker serves a snapshot of
/// the registrations taken at that point.
pub struct PlotServer {
    registry: PlotRegistry,
    state: Mutex<ServerState>,
}

impl PlotServer {
    /// Create an adapter with no registrations and no worker.
    pub fn new() -> Self {
        Self {
            registry: PlotRegistry::new(),
            state: Mutex::new(ServerState::default()),
        }
    }

    /// Register a plot callback under `path`, replacing any earlier
    /// registration for the same path.
    ///
    /// Effective only for registrations made before [`start`](Self::start);
    /// the running application is not rebuilt.
    pub fn add_plot<F>(&self, path: impl Into<String>, plot: F)
    where
        F: Fn(&mut Document) + Send + Sync + 'static,
    {
        self.registry.insert(path, plot);
    }

    /// Start the plot server.
    ///
    /// Spawns the worker thread, waits for it to bind `hostname:port`, and
    /// returns the bound port. Returns an error if the server is already
    /// running or the bind fails.
    pub fn start(&self, config: PlotServerConfig) -> Result<u16, ServerError> {
        let mut state = self.lock_state();
        if state.running {
            return Err(ServerError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (bind_tx, bind_rx) = mpsc::channel();
        let router = build_router(self.registry.snapshot());
        let addr = config.socket_addr();

        let worker = thread::Builder::new()
            .name("plotbridge-server".to_string())
            .spawn(move || serve_worker(addr, router, bind_tx, shutdown_rx))
            .map_err(ServerError::Spawn)?;

        match bind_rx.recv_timeout(BIND_WAIT) {
            Ok(Ok(port)) => {
                info!("Plot server listening on http://{}:{}", config.hostname, port);
                state.hostname = Some(config.hostname);
                state.port = Some(port);
                state.running = true;
                state.shutdown = Some(shutdown_tx);
                state.worker = Some(worker);
                Ok(port)
            }
            Ok(Err(e)) => Err(ServerError::Bind(e)),
            Err(_) => Err(ServerError::WorkerGone),
        }
    }

    /// Stop the plot server.
    ///
    /// Signals graceful shutdown to the served application and clears the
    /// running flag. Best-effort: does not wait for the worker thread to
    /// exit. No-op on a never-started adapter.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        if let Some(shutdown) = state.shutdown.take() {
            info!("Stopping plot server");
            let _ = shutdown.send(true);
        }
        state.running = false;
    }

    /// Whether the server is bound and accepting connections.
    pub fn is_running(&self) -> bool {
        self.lock_state().running
    }

    /// Hostname recorded by the last successful `start`.
    pub fn hostname(&self) -> Option<String> {
        self.lock_state().hostname.clone()
    }

    /// Port bound by the last successful `start`.
    pub fn port(&self) -> Option<u16> {
        self.lock_state().port
    }

    /// Embeddable markup for the plot registered at `path`.
    ///
    /// Pure formatting over the recorded hostname and port; the path is not
    /// checked against the registrations, so a typo yields markup that loads
    /// nothing. Errors only if the server was never started.
    pub fn plot_script(&self, path: &str) -> Result<String, ServerError> {
        let state = self.lock_state();
        let (hostname, port) = match (&state.hostname, state.port) {
            (Some(hostname), Some(port)) => (hostname, port),
            _ => return Err(ServerError::NotStarted),
        };
        Ok(embed::autoload_script(&format!(
            "http://{hostname}:{port}{path}"
        )))
    }

    /// The underlying registration table.
    pub fn registry(&self) -> &PlotRegistry {
        &self.registry
    }

    fn lock_state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("server state lock poisoned")
    }
}

impl Default for PlotServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker thread body: build an isolated runtime, bind the listener, report
/// the result back to `start`, then serve until shutdown is signalled.
///
/// Dropping the adapter closes the watch channel, which also ends the serve
/// loop.
fn serve_worker(
    addr: String,
    router: Router,
    bind_tx: mpsc::Sender<std::io::Result<u16>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let rt = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = bind_tx.send(Err(e));
            return;
        }
    };

    rt.block_on(async move {
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                let _ = bind_tx.send(Err(e));
                return;
            }
        };
        let port = match listener.local_addr() {
            Ok(local) => local.port(),
            Err(e) => {
                let _ = bind_tx.send(Err(e));
                return;
            }
        };
        let _ = bind_tx.send(Ok(port));

        let shutdown = async move {
            while shutdown_rx.changed().await.is_ok() {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        };

        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("Plot server terminated: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_adapter_is_unset() {
        let server = PlotServer::new();
        assert!(server.hostname().is_none());
        assert!(server.port().is_none());
        assert!(!server.is_running());
        assert!(server.registry().is_empty());
    }

    #[test]
    fn test_add_plot_registers_path() {
        let server = PlotServer::new();
        server.add_plot("/my_plot", |_doc: &mut Document| {});
        assert!(server.registry().contains("/my_plot"));
        assert_eq!(server.registry().len(), 1);
    }

    #[test]
    fn test_add_plot_last_write_wins() {
        let server = PlotServer::new();
        server.add_plot("/my_plot", |doc: &mut Document| doc.set_title("old"));
        server.add_plot("/my_plot", |doc: &mut Document| doc.set_title("new"));

        assert_eq!(server.registry().len(), 1);
        let doc = server.registry().build("/my_plot").unwrap();
        assert_eq!(doc.title(), "new");
    }

    #[test]
    fn test_two_paths_independent() {
        let server = PlotServer::new();
        server.add_plot("/a", |doc: &mut Document| doc.set_title("a"));
        server.add_plot("/b", |doc: &mut Document| doc.set_title("b"));

        assert!(server.registry().contains("/a"));
        assert!(server.registry().contains("/b"));
        assert_eq!(server.registry().build("/b").unwrap().title(), "b");
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let server = PlotServer::new();
        server.stop();
        assert!(!server.is_running());
    }

    #[test]
    fn test_plot_script_requires_start() {
        let server = PlotServer::new();
        let result = server.plot_script("/my_plot");
        assert!(matches!(result, Err(ServerError::NotStarted)));
    }

    #[test]
    fn test_config_defaults() {
        let config = PlotServerConfig::default();
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.socket_addr(), "localhost:5006");
    }

    #[test]
    fn test_start_binds_and_records_endpoint() {
        let server = PlotServer::new();
        server.add_plot("/my_plot", |_doc: &mut Document| {});

        let port = server
            .start(PlotServerConfig::new("127.0.0.1", 0))
            .unwrap();

        assert!(port > 0);
        assert!(server.is_running());
        assert_eq!(server.hostname().as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port(), Some(port));

        let script = server.plot_script("/my_plot").unwrap();
        assert!(script.starts_with("\n<script "));
        assert!(script.contains(&format!(
            "bokeh-absolute-url=http://127.0.0.1:{port}/my_plot"
        )));
        assert!(script.ends_with("</script>"));

        server.stop();
        assert!(!server.is_running());
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let server = PlotServer::new();
        server
            .start(PlotServerConfig::new("127.0.0.1", 0))
            .unwrap();

        let result = server.start(PlotServerConfig::new("127.0.0.1", 0));
        assert!(matches!(result, Err(ServerError::AlreadyRunning)));

        server.stop();
    }

    #[test]
    fn test_bind_failure_is_reported() {
        let first = PlotServer::new();
        let port = first
            .start(PlotServerConfig::new("127.0.0.1", 0))
            .unwrap();

        let second = PlotServer::new();
        let result = second.start(PlotServerConfig::new("127.0.0.1", port));
        assert!(matches!(result, Err(ServerError::Bind(_))));
        assert!(!second.is_running());

        first.stop();
    }
}
