//! Share-relative path handling.

/// Split a share-relative path (`.`, `./reports`, `reports/a.dcm`) into its
/// components. Returns `None` for paths that would escape the share.
pub(crate) fn components(path: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return None,
            other => parts.push(other),
        }
    }
    Some(parts)
}

/// Normalize a share-relative path to the `./a/b` form.
pub(crate) fn normalize(path: &str) -> Option<String> {
    let parts = components(path)?;
    let mut out = String::from(".");
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    Some(out)
}
