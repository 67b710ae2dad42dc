//! Markup rendering of snapshot logs.

use crate::error::{ConfigError, VaultResult};
use crate::request::RequestConfig;
use reqwest::Url;
use scriptvault_snapshot::Snapshot;
use std::fmt::Write;

/// Shown in place of a fragment when the (filtered) log is empty.
pub const NO_HISTORIES: &str = "No histories.";

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// One section per snapshot: revert/delete buttons, a heading with the
/// timestamp and one textarea per file.
pub fn fragment(snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return NO_HISTORIES.to_string();
    }

    let mut html = String::new();
    for snapshot in snapshots {
        let ts = escape(&snapshot.timestamp);
        let _ = write!(
            html,
            r#"<input type="button" value="Back to '{ts}'." data-operation="revert" data-timestamp="{ts}">"#
        );
        let _ = write!(
            html,
            r#"<input type="button" value="Delete this history." data-operation="delete" data-timestamp="{ts}">"#
        );
        let _ = write!(html, r#"<h2 class="open_h2 btn">{ts}</h2><div class="open_parent open">"#);
        for file in &snapshot.files {
            let _ = write!(
                html,
                r#"<h3 class="open_h3 btn">{}</h3><textarea class="open_textarea open">{}</textarea>"#,
                escape(&file.name),
                escape(&file.source)
            );
        }
        html.push_str("</div>");
    }
    html
}

/// A full page around `fragment` whose buttons call back into the service
/// with `internal=true` and swap in the returned fragment.
pub fn page(project_id: &str, container_id: &str, search: &str, fragment: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>History of {project}</title>
<style>
.open_textarea {{ width: 100%; height: 12em; font-family: monospace; }}
.btn {{ cursor: pointer; }}
.closed {{ display: none; }}
</style>
</head>
<body data-project="{project}" data-container="{container}" data-search="{search}">
<h1>History of {project}</h1>
<div id="histories">{fragment}</div>
<script>
const body = document.body;
const histories = document.getElementById("histories");
histories.addEventListener("click", async (event) => {{
  const el = event.target;
  if (el.matches("h2.btn, h3.btn")) {{
    el.nextElementSibling.classList.toggle("closed");
    return;
  }}
  const operation = el.dataset.operation;
  if (!operation) return;
  const timestamp = el.dataset.timestamp;
  if (!confirm(operation === "revert" ? `Restore '${{timestamp}}'?` : `Delete '${{timestamp}}'?`)) return;
  const params = new URLSearchParams({{
    operation,
    projectId: body.dataset.project,
    containerId: body.dataset.container,
    searchPattern: body.dataset.search,
    internal: "true",
  }});
  params.set(operation === "revert" ? "targetTimestamp" : "deleteTimestamp", timestamp);
  el.disabled = true;
  const res = await fetch("?" + params.toString(), {{ method: "POST" }});
  const text = await res.text();
  if (res.ok) {{
    histories.innerHTML = text;
  }} else {{
    alert(text);
    el.disabled = false;
  }}
}});
</script>
</body>
</html>
"#,
        project = escape(project_id),
        container = escape(container_id),
        search = escape(search),
        fragment = fragment,
    )
}

/// URL of the markup view for `request`'s project and search.
pub fn list_url(public_url: &str, request: &RequestConfig) -> VaultResult<String> {
    let base = format!("{}/", public_url.trim_end_matches('/'));
    let url = Url::parse_with_params(
        &base,
        &[
            ("operation", "list"),
            ("asMarkup", "true"),
            ("projectId", request.project_id.as_str()),
            ("containerId", request.container_id.as_str()),
            ("searchPattern", request.search_text.as_str()),
        ],
    )
    .map_err(|e| ConfigError::InvalidValue {
        field: "server.public_url".into(),
        message: e.to_string(),
    })?;
    Ok(url.to_string())
}

/// The message that accompanies a link to the markup view.
pub fn link_message(url: &str) -> String {
    format!("Please access the URL \"{url}\" using your browser.")
}
