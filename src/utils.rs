use std::path::{Path, PathBuf};

/// Shorten `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(&"..."[..max_len.min(3)]);
    out
}

/// Add `.extension` to `name` unless it already ends with it (any case).
pub fn with_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Resolve an output name against the scanned directory.
///
/// Relative names land inside `dir`; absolute paths are used unchanged.
pub fn output_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(with_extension(name, extension))
}
