//! Plot registration table
//!
//! Maps URL paths to the callbacks that build their documents. Registrations
//! are last-write-wins per path and are never individually removed; the
//! server snapshots the table once at start, so later registrations are not
//! served until a restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::Document;

/// A callback that populates a document with plot content.
pub type PlotFn = dyn Fn(&mut Document) + Send + Sync;

/// Thread-safe table of path -> plot callback registrations.
#[derive(Default)]
pub struct PlotRegistry {
    plots: RwLock<HashMap<String, Arc<PlotFn>>>,
}

impl PlotRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plot` under `path`, replacing any earlier registration for
    /// the same path.
    pub fn insert<F>(&self, path: impl Into<String>, plot: F)
    where
        F: Fn(&mut Document) + Send + Sync + 'static,
    {
        let path = path.into();
        debug!("Registering plot at {}", path);
        self.plots
            .write()
            .expect("plot registry lock poisoned")
            .insert(path, Arc::new(plot));
    }

    /// Check whether a plot is registered at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.plots
            .read()
            .expect("plot registry lock poisoned")
            .contains_key(path)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.plots
            .read()
            .expect("plot registry lock poisoned")
            .len()
    }

    /// Whether the registry has no registrations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered paths, in no particular order.
    pub fn paths(&self) -> Vec<String> {
        self.plots
            .read()
            .expect("plot registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Run the callback registered at `path` on a fresh document.
    ///
    /// The lock is released before the callback runs, so a callback may
    /// itself touch the registry without deadlocking.
    pub fn build(&self, path: &str) -> Option<Document> {
        let plot = self
            .plots
            .read()
            .expect("plot registry lock poisoned")
            .get(path)
            .cloned()?;

        let mut doc = Document::new();
        plot(&mut doc);
        Some(doc)
    }

    /// Clone the current registrations for the server application.
    pub fn snapshot(&self) -> HashMap<String, Arc<PlotFn>> {
        self.plots
            .read()
            .expect("plot registry lock poisoned")
            .clone()
    }
}
