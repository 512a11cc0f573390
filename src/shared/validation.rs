use lazy_static::lazy_static;
use regex::Regex;

/// Longest file name segment kept in an object key
pub const MAX_KEY_NAME_LENGTH: usize = 128;

lazy_static! {
    /// Characters that are not safe inside an S3 object key segment.
    /// Anything outside `[A-Za-z0-9._-]` is replaced.
    /// - Kept: "report-2024_v1.pdf"
    /// - Replaced: "my file (1).txt" -> "my_file__1_.txt"
    static ref UNSAFE_KEY_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Turn a client-supplied file name into a flat, key-safe segment.
///
/// Directory components are dropped, unsafe characters replaced with `_`,
/// leading dots stripped (no hidden keys) and the result truncated to
/// `MAX_KEY_NAME_LENGTH` characters. Falls back to `"file"` when nothing is left.
pub fn sanitize_object_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let replaced = UNSAFE_KEY_CHARS.replace_all(base, "_");
    let trimmed = replaced.trim_start_matches('.');

    let sanitized: String = trimmed.chars().take(MAX_KEY_NAME_LENGTH).collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_object_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_object_name("report-2024_v1.pdf"), "report-2024_v1.pdf");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_object_name("my file (1).txt"), "my_file__1_.txt");
        assert_eq!(sanitize_object_name("naïve.txt"), "na_ve.txt");
    }

    #[test]
    fn test_sanitize_drops_directories_and_hidden_prefix() {
        assert_eq!(sanitize_object_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_object_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize_object_name(".env"), "env");
    }

    #[test]
    fn test_sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_object_name(""), "file");
        assert_eq!(sanitize_object_name("..."), "file");
        assert_eq!(sanitize_object_name("???"), "file");
    }

    #[test]
    fn test_sanitize_truncates_long_names() {
        let long_name = "a".repeat(500);
        assert_eq!(sanitize_object_name(&long_name).len(), MAX_KEY_NAME_LENGTH);
    }
}
