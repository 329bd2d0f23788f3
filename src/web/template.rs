//! `$` placeholder templating for served HTML files.
//!
//! Every `$` in a templated file is a placeholder. Placeholders are numbered
//! from zero in document order, and each one is replaced by the value the
//! [`PlaceholderTable`] holds for the file at that index. Files are keyed by
//! their path relative to the asset root (`index.html`, `sub/page.html`).
//! Files or indices without a value render as nothing. Rendering works on
//! raw bytes, so content that is not UTF-8 passes through untouched.

use std::collections::HashMap;

/// Placeholder marker byte.
pub const PLACEHOLDER: u8 = b'$';

/// Source of placeholder values, keyed by asset path.
pub trait TemplateSource {
    /// Returns the replacement for placeholder `index` of the asset at
    /// `asset_path` (relative to the asset root, `/`-separated).
    fn value(&self, asset_path: &str, index: usize) -> Option<&str>;
}

/// Fixed placeholder values per asset path.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTable {
    files: HashMap<String, Vec<String>>,
}

impl PlaceholderTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the values for the asset at `asset_path`.
    pub fn insert(&mut self, asset_path: impl Into<String>, values: Vec<String>) {
        self.files.insert(asset_path.into(), values);
    }
}

impl TemplateSource for PlaceholderTable {
    fn value(&self, asset_path: &str, index: usize) -> Option<&str> {
        self.files
            .get(asset_path)
            .and_then(|values| values.get(index))
            .map(String::as_str)
    }
}

/// Renders `content`, replacing each placeholder with its value.
pub fn render<S: TemplateSource + ?Sized>(content: &[u8], asset_path: &str, source: &S) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut parts = content.split(|&b| b == PLACEHOLDER);

    if let Some(first) = parts.next() {
        out.extend_from_slice(first);
    }
    for (index, part) in parts.enumerate() {
        if let Some(value) = source.value(asset_path, index) {
            out.extend_from_slice(value.as_bytes());
        }
        out.extend_from_slice(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_table() -> PlaceholderTable {
        let mut table = PlaceholderTable::new();
        table.insert(
            "index.html",
            vec!["A".to_string(), "B".to_string(), String::new()],
        );
        table
    }

    #[test]
    fn replaces_placeholders_in_order() {
        let html = b"<p>$</p><p>$</p><p>$</p>";
        assert_eq!(
            render(html, "index.html", &index_table()),
            b"<p>A</p><p>B</p><p></p>".to_vec()
        );
    }

    #[test]
    fn extra_placeholders_render_empty() {
        assert_eq!(render(b"$-$-$-$", "index.html", &index_table()), b"A-B--".to_vec());
    }

    #[test]
    fn unknown_file_drops_placeholders() {
        assert_eq!(render(b"a$b", "other.html", &index_table()), b"ab".to_vec());
    }

    #[test]
    fn nested_file_with_same_name_is_a_different_asset() {
        assert_eq!(render(b"a$b", "sub/index.html", &index_table()), b"ab".to_vec());
    }

    #[test]
    fn content_without_placeholders_is_unchanged() {
        assert_eq!(
            render(b"<html></html>", "index.html", &index_table()),
            b"<html></html>".to_vec()
        );
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let content = [0xff, b'$', 0xfe, 0x80];
        assert_eq!(
            render(&content, "index.html", &index_table()),
            vec![0xff, b'A', 0xfe, 0x80]
        );
    }

    #[test]
    fn adjacent_placeholders() {
        assert_eq!(render(b"$$", "index.html", &index_table()), b"AB".to_vec());
    }
}
