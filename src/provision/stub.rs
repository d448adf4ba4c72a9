//! Fallback stub rendering.
//!
//! The stub stands in for the real binary when none could be obtained.
//! Running it prints where to get the tool manually and exits with status 1.

/// Marker line identifying a stub written by this installer.
pub const STUB_MARKER: &str = "aether-bootstrap fallback stub";

/// Files larger than this are never stubs.
pub const MAX_STUB_LEN: u64 = 4096;

/// Contents of the stub for `binary_name`, pointing users at `releases_page`.
///
/// Both values are escaped for the target shell, so a release URL cannot
/// inject commands into the stub.
pub fn render(binary_name: &str, releases_page: &str, windows: bool) -> String {
    if windows {
        let binary_name = cmd_escape(binary_name);
        let releases_page = cmd_escape(releases_page);
        format!(
            "@echo off\r\n\
             rem {marker}\r\n\
             echo {name}: no prebuilt binary could be installed for this platform. 1>&2\r\n\
             echo Download it manually from {page} 1>&2\r\n\
             exit /b 1\r\n",
            name = binary_name,
            page = releases_page,
            marker = STUB_MARKER,
        )
    } else {
        let binary_name = sh_escape(binary_name);
        let releases_page = sh_escape(releases_page);
        format!(
            "#!/bin/sh\n\
             # {marker}\n\
             printf '%s\\n' \"{name}: no prebuilt binary could be installed for this platform.\" >&2\n\
             printf '%s\\n' \"Download it manually from {page}\" >&2\n\
             exit 1\n",
            name = binary_name,
            page = releases_page,
            marker = STUB_MARKER,
        )
    }
}

/// Escape `text` for use inside a double-quoted `sh` string.
fn sh_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape `text` for an unquoted `echo` in a batch file.
fn cmd_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' => escaped.push_str("%%"),
            '^' | '&' | '|' | '<' | '>' | '(' | ')' => {
                escaped.push('^');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whether `contents` is a stub written by [`render`].
pub fn is_stub(contents: &str) -> bool {
    contents.lines().take(3).any(|line| line.contains(STUB_MARKER))
}
