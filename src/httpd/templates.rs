// templates: This module deals with httpd templates
#![forbid(unsafe_code)]
use super::errors::HttpdError;
use askama::Template;
use axum::body::Bytes;
use tracing::debug;

// Template for the index served at /, linking browsers to the metrics.
// Escaping is disabled since we're passing a path and don't want the / to be
// escaped.
#[derive(Template)]
#[template(path = "index.html", escape = "none")]
struct IndexTemplate<'a> {
    telemetry_path: &'a str,
}

// Renders the index page template.
pub(in crate::httpd)
fn render_index_page(telemetry_path: &str)
-> Result<Bytes, HttpdError> {
    debug!("Rendering index template");

    let index_template = IndexTemplate {
        telemetry_path,
    };

    let rendered = index_template.render()?;

    Ok(Bytes::from(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_index_page_ok() {
        let rendered = render_index_page("/a1b2c3").unwrap();
        let ok = indoc!(
            r#"
            <!DOCTYPE html>
            <html lang="en">
                <head>
                    <meta charset="UTF-8">
                    <title>RCTL Exporter</title>
                </head>
                <body>
                    <h1>RCTL Exporter</h1>
                    <p>Resource usage as accounted by rctl(8).</p>
                    <p><a href="/a1b2c3">Metrics</a></p>
                </body>
            </html>"#
        );
        assert_eq!(rendered, ok);
    }
}
