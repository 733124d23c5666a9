/// Display labels derived from host tab and group data
use url::Url;

pub const UNTITLED_TAB: &str = "Untitled";
pub const UNNAMED_GROUP: &str = "Unnamed group";
pub const NEW_TAB_LABEL: &str = "New Tab";
pub const EMPTY_STATE_LABEL: &str = "No tabs";

/// Extract the hostname shown under a tab title
///
/// Algorithm:
/// 1. Empty URL → the new-tab placeholder (uninitialized new-tab page)
/// 2. Parse with the WHATWG URL parser
/// 3. Unparseable, or no host (about:blank, data: URLs) → placeholder
/// 4. Else → the host exactly as the browser would show it
///
/// Examples:
/// - https://www.google.com/search → www.google.com
/// - http://localhost:3000/ → localhost
/// - chrome://extensions/ → extensions
/// - "" → New Tab
pub fn display_hostname(url: &str) -> String {
    extract_hostname(url).unwrap_or_else(|| NEW_TAB_LABEL.to_string())
}

fn extract_hostname(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub fn display_tab_title(title: Option<&str>) -> String {
    non_empty(title).unwrap_or_else(|| UNTITLED_TAB.to_string())
}

pub fn display_group_title(title: Option<&str>) -> String {
    non_empty(title).unwrap_or_else(|| UNNAMED_GROUP.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
