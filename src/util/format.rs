//! Text formatting helpers shared by the mapping engine and the emitter.

use std::path::{Component, Path};

/// Format a number the way the emitted documents expect it.
///
/// Rounds to six decimals, trims trailing zeros and always keeps one
/// fractional digit, so `1.0 - 0.8` prints as `0.2` and `1` as `1.0`.
pub fn fmt_float(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    let mut s = format!("{:.6}", value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    if s == "-0.0" {
        s = "0.0".to_string();
    }
    s
}

/// Join path components with forward slashes regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path shown in comments and logs: relative to `root` when possible.
pub fn display_path(path: &Path, root: Option<&Path>) -> String {
    match root.and_then(|r| path.strip_prefix(r).ok()) {
        Some(rel) => slash_path(rel),
        None => slash_path(path),
    }
}

/// Strip the source engine's leading underscore convention from a name.
pub fn strip_prefix(name: &str) -> &str {
    name.trim_start_matches('_')
}

/// Quote a string for a Godot text resource.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fmt_float() {
        assert_eq!(fmt_float(1.0 - 0.8), "0.2");
        assert_eq!(fmt_float(0.2), "0.2");
        assert_eq!(fmt_float(1.0), "1.0");
        assert_eq!(fmt_float(0.0), "0.0");
        assert_eq!(fmt_float(-0.0), "0.0");
        assert_eq!(fmt_float(-1.25), "-1.25");
        assert_eq!(fmt_float(f64::NAN), "0.0");
    }

    #[test]
    fn test_display_path() {
        let root = PathBuf::from("project");
        let p = root.join("Assets").join("Shaders").join("Ink.shader");
        assert_eq!(display_path(&p, Some(&root)), "Assets/Shaders/Ink.shader");
        assert_eq!(display_path(&p, None), "project/Assets/Shaders/Ink.shader");
    }

    #[test]
    fn test_strip_prefix_and_quote() {
        assert_eq!(strip_prefix("_MainTex"), "MainTex");
        assert_eq!(strip_prefix("MainTex"), "MainTex");
        assert_eq!(quote("a \"b\""), "\"a \\\"b\\\"\"");
    }
}
