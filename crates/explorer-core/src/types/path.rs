//! Root-aware helpers for slash-separated explorer paths.
//!
//! Explorer paths always start at `/`. No syntax validation happens here;
//! an invalid path is the backend's to reject.

/// The root directory.
pub const ROOT: &str = "/";

/// Joins a directory path and an entry name without doubling the slash at root.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT || dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}

/// Returns the parent directory, or `/` for root and top-level entries.
pub fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Returns the last segment of a path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Returns the lowercase extension of a file name, if it has one.
///
/// Dot-files such as `.env` count as having the extension `env`.
pub fn extension(name: &str) -> Option<String> {
    let base = file_name(name);
    base.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// Normalizes a path: backslashes to `/`, `.` and `..` resolved, leading slash.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let mut out = String::new();
    for segment in trimmed.replace('\\', "/").split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            if let Some(idx) = out.rfind('/') {
                out.truncate(idx);
            }
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() { ROOT.to_string() } else { out }
}
