//! Path normalization.
//!
//! Paths accept `/` or `\` separators. The normalized form drops empty and
//! blank components, joins with `/`, and ends with a trailing `/`
//! (`"a//b\\c"` becomes `"a/b/c/"`). The empty path normalizes to `""`.

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

/// Normalize a path into the cache key form.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for component in components(path) {
        out.push_str(component);
        out.push('/');
    }
    out
}

/// Split a path into its normalized ancestor path and its leaf name.
///
/// Returns `None` for a path with no components. The ancestor is `None` when
/// the leaf sits directly under the root.
pub fn split_path(path: &str) -> Option<(Option<String>, String)> {
    let parts: Vec<&str> = components(path).collect();
    let (leaf, ancestors) = parts.split_last()?;
    let ancestor = if ancestors.is_empty() {
        None
    } else {
        let mut joined = ancestors.join("/");
        joined.push('/');
        Some(joined)
    };
    Some((ancestor, (*leaf).to_string()))
}

/// Human-readable form of a path: normalized, without the trailing `/`.
pub fn display_path(path: &str) -> String {
    let normalized = normalize_path(path);
    normalized.trim_end_matches('/').to_string()
}

/// Join a folder path and a child name into a normalized path.
pub fn join_path(parent: &str, name: &str) -> String {
    normalize_path(&format!("{parent}/{name}"))
}
