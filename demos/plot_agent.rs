//! Demo agent with an embedded plot server.
//!
//! The plot server listens on the default port and the agent's own web
//! endpoint on port 10000. Visit http://127.0.0.1:10000/plot for a page that
//! embeds the registered sine plot.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use plotbridge::{PlotHost, PlotServer, PlotServerConfig};
use serde_json::json;
use tracing::info;

struct DemoAgent {
    plots: PlotServer,
}

impl PlotHost for DemoAgent {
    fn plot_server(&self) -> &PlotServer {
        &self.plots
    }
}

async fn plot_page(State(agent): State<Arc<DemoAgent>>) -> Html<String> {
    let script = agent.plot_script("/my_plot").unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html>\n<html><body>\n<h1>Agent plots</h1>{script}\n</body></html>\n"
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let agent = Arc::new(DemoAgent {
        plots: PlotServer::new(),
    });

    agent.plots.add_plot("/my_plot", |doc| {
        let xs: Vec<f64> = (0..100).map(|i| f64::from(i) / 10.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        doc.set_title("Sine");
        doc.add_root(json!({"type": "line", "x": xs, "y": ys}));
    });
    agent.plots.start(PlotServerConfig::default())?;

    let app = Router::new()
        .route("/plot", get(plot_page))
        .with_state(Arc::clone(&agent));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:10000").await?;
    info!("Agent web endpoint on http://127.0.0.1:10000/plot");
    axum::serve(listener, app).await?;

    agent.plots.stop();
    Ok(())
}
