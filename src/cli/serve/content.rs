//! Live reload script injection for served HTML.

use crate::embed::serve::script_tag;
use crate::utils::mime;

/// Inject the reload script when live reload is on and the body is HTML.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, live_reload: bool) -> Vec<u8> {
    if live_reload && mime::is_html(content_type) {
        inject_hotreload_script(&body)
    } else {
        body
    }
}

/// Insert the script before the last `</body>`, or append when there is none.
fn inject_hotreload_script(content: &[u8]) -> Vec<u8> {
    let script = script_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script_bytes);
    result.extend_from_slice(&content[pos..]);
    result
}
