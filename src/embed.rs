//! Embeddable script markup
//!
//! Turns an absolute plot URL into the `<script>` element a page embeds to
//! load that plot from the server. Attribute and query-parameter names
//! follow the autoload convention understood by bokeh-style chart frontends,
//! so the output can be dropped into any page those frontends already serve.

use uuid::Uuid;

/// Produce the embeddable `<script>` element for a server-hosted plot.
///
/// `url` is the absolute URL of the plot application, e.g.
/// `http://localhost:5006/my_plot`. The element id is freshly generated, so
/// the same plot can be embedded more than once on a page.
pub fn autoload_script(url: &str) -> String {
    autoload_script_with_id(url, &Uuid::new_v4().simple().to_string())
}

/// Same as [`autoload_script`] with a caller-chosen element id.
pub fn autoload_script_with_id(url: &str, element_id: &str) -> String {
    format!(
        "\n<script id=\"{id}\" src=\"{url}/autoload.js?bokeh-autoload-element={id}&bokeh-app-path={path}&bokeh-absolute-url={url}\"></script>",
        id = element_id,
        url = url,
        path = app_path_of(url),
    )
}

/// Extract the path component of an absolute plot URL.
fn app_path_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match rest.find('/') {
        Some(i) => &rest[i..],
        None => "/",
    }
}
