//! End-to-end lifecycle: start on an ephemeral port, fetch the app page and
//! the autoload payload over real HTTP, then stop.

use plotbridge::{PlotServer, PlotServerConfig};
use serde_json::json;

#[tokio::test]
async fn serves_registered_plots_over_http() {
    let server = PlotServer::new();
    server.add_plot("/temperature", |doc| {
        doc.set_title("Temperature");
        doc.add_root(json!({"type": "line", "x": [0, 1, 2], "y": [20.0, 21.5, 21.1]}));
    });

    let port = server
        .start(PlotServerConfig::new("127.0.0.1", 0))
        .unwrap();
    assert!(server.is_running());
    let base = format!("http://127.0.0.1:{port}");

    // App page at the registered path.
    let page = reqwest::get(format!("{base}/temperature")).await.unwrap();
    assert_eq!(page.status(), 200);
    let body = page.text().await.unwrap();
    assert!(body.contains("<title>Temperature</title>"));

    // Autoload payload consumed by the embed script tag.
    let js = reqwest::get(format!(
        "{base}/temperature/autoload.js?bokeh-autoload-element=el-1"
    ))
    .await
    .unwrap();
    assert_eq!(js.status(), 200);
    assert_eq!(js.headers()["content-type"], "application/javascript");
    let js_body = js.text().await.unwrap();
    assert!(js_body.contains("\"el-1\""));
    assert!(js_body.contains("Temperature"));

    // Unregistered paths 404.
    let missing = reqwest::get(format!("{base}/unknown")).await.unwrap();
    assert_eq!(missing.status(), 404);

    // Embed markup references the bound endpoint.
    let script = server.plot_script("/temperature").unwrap();
    assert!(script.starts_with("\n<script "));
    assert!(script.contains(&format!(
        "bokeh-absolute-url=http://127.0.0.1:{port}/temperature"
    )));
    assert!(script.ends_with("</script>"));

    server.stop();
    assert!(!server.is_running());
}

#[tokio::test]
async fn registrations_after_start_are_not_served() {
    let server = PlotServer::new();
    server.add_plot("/before", |doc| doc.set_title("before"));

    let port = server
        .start(PlotServerConfig::new("127.0.0.1", 0))
        .unwrap();
    server.add_plot("/after", |doc| doc.set_title("after"));

    let base = format!("http://127.0.0.1:{port}");
    let before = reqwest::get(format!("{base}/before")).await.unwrap();
    assert_eq!(before.status(), 200);

    // Registered in the table, but not picked up by the running app.
    assert!(server.registry().contains("/after"));
    let after = reqwest::get(format!("{base}/after")).await.unwrap();
    assert_eq!(after.status(), 404);

    server.stop();
}
