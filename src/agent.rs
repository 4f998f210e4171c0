//! Host-agent integration
//!
//! The adapter is attached to an agent by plain composition: the agent owns
//! a [`PlotServer`] field and exposes it through [`PlotHost`]. Handlers on
//! the agent's own web endpoint then call [`PlotHost::plot_script`] to
//! obtain the markup their pages embed.

use crate::server::{PlotServer, ServerError};

/// An agent that carries an embedded plot server.
pub trait PlotHost {
    /// The embedded plot server owned by this agent.
    fn plot_server(&self) -> &PlotServer;

    /// Embeddable markup for the plot registered at `path`.
    fn plot_script(&self, path: &str) -> Result<String, ServerError> {
        self.plot_server().plot_script(path)
    }

    /// Whether the embedded server is accepting connections.
    fn plots_running(&self) -> bool {
        self.plot_server().is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAgent {
        plots: PlotServer,
    }

    impl PlotHost for TestAgent {
        fn plot_server(&self) -> &PlotServer {
            &self.plots
        }
    }

    #[test]
    fn test_host_forwards_to_adapter() {
        let agent = TestAgent {
            plots: PlotServer::new(),
        };

        assert!(!agent.plots_running());
        assert!(matches!(
            agent.plot_script("/my_plot"),
            Err(ServerError::NotStarted)
        ));
    }
}
