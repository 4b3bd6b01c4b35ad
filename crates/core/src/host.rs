//! Host-page route recognition.
//!
//! The browser companion only surfaces its import panel on the journaling
//! app's file-upload pages. The rule lives here so every front-end agrees
//! on it.

/// Path prefixes of the recognized upload pages.
pub const TARGET_PATHS: [&str; 2] = [
    "/ftux-add-trade/generic/upload",
    "/tracking/add-trade/file_upload",
];

/// True for a recognized path: an exact match or a sub-path of one of the
/// target prefixes. Trailing slashes are ignored.
pub fn is_target_path(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    TARGET_PATHS.iter().any(|target| {
        path.strip_prefix(target)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
