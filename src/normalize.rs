/// Resolve `.` and `..` segments of an absolute url path without touching the
/// filesystem. `..` never climbs above the root, and a trailing slash is kept.
///
/// `Url::parse` already resolves dot segments (`%2e` included), so for parsed
/// urls this is a second pass that keeps the prefix check independent of the
/// parser's behavior.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    let ends_in_dir = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if ends_in_dir && !segments.is_empty() {
        normalized.push('/');
    }
    normalized
}
