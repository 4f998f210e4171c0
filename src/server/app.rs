//! Served plot application
//!
//! The axum router hosted by the background worker. Registered paths are
//! arbitrary strings chosen by the caller, so requests are dispatched
//! through a lookup table in a fallback handler instead of compiled routes.
//! Each registered path answers on two endpoints: the path itself serves an
//! HTML app page, and `{path}/autoload.js` serves the payload requested by
//! the embed `<script>` element.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::plot::{Document, PlotFn};

/// Suffix under a registered path that serves the autoload payload.
const AUTOLOAD_SUFFIX: &str = "/autoload.js";

/// Immutable snapshot of the registrations, taken when the server started.
#[derive(Clone)]
pub(crate) struct PlotApp {
    plots: Arc<HashMap<String, Arc<PlotFn>>>,
}

impl PlotApp {
    /// Run the callback registered at `path` on a fresh document.
    fn build(&self, path: &str) -> Option<Document> {
        let plot = self.plots.get(path)?;
        let mut doc = Document::new();
        plot(&mut doc);
        Some(doc)
    }
}

/// Query parameters carried by the embed script's autoload request.
#[derive(Debug, Deserialize)]
struct AutoloadParams {
    #[serde(rename = "bokeh-autoload-element")]
    element: Option<String>,
}

/// Build the router served by the worker thread.
///
/// CORS is permissive: the embed page is served from the agent's own web
/// port, which the browser treats as a different origin.
pub(crate) fn build_router(plots: HashMap<String, Arc<PlotFn>>) -> Router {
    let app = PlotApp {
        plots: Arc::new(plots),
    };
    Router::new()
        .fallback(serve)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

/// Dispatch a request against the registration table.
async fn serve(
    State(app): State<PlotApp>,
    Query(params): Query<AutoloadParams>,
    uri: Uri,
) -> Response {
    let path = uri.path();

    if let Some(plot_path) = path.strip_suffix(AUTOLOAD_SUFFIX) {
        if let Some(doc) = app.build(plot_path) {
            return autoload_response(&doc, params.element.as_deref());
        }
    }

    if let Some(doc) = app.build(path) {
        return page_response(&doc);
    }

    debug!("No plot registered at {}", path);
    (StatusCode::NOT_FOUND, "no plot registered at this path").into_response()
}

/// JavaScript payload consumed by the embed `<script>` element.
///
/// Rendering proper is delegated to the chart frontend loaded by the
/// embedding page; this payload only hands it the serialized document.
fn autoload_response(doc: &Document, element: Option<&str>) -> Response {
    let doc_json = doc.to_json();
    let element_json = serde_json::Value::from(element.unwrap_or_default());
    let body = format!(
        "(function() {{\n  var doc = {doc_json};\n  var id = {element_json};\n  var el = id ? document.getElementById(id) : null;\n  if (el) {{\n    el.dataset.plotDocument = JSON.stringify(doc);\n    el.dispatchEvent(new CustomEvent(\"plot-document-ready\", {{ detail: doc }}));\n  }}\n}})();\n"
    );
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        body,
    )
        .into_response()
}

/// Standalone HTML app page for a plot.
fn page_response(doc: &Document) -> Response {
    let title = if doc.title().is_empty() {
        "plotbridge"
    } else {
        doc.title()
    };
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<script type=\"application/json\" id=\"plot-document\">{doc}</script>\n</body>\n</html>\n",
        title = escape_html(title),
        doc = doc.to_json(),
    ))
    .into_response()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
