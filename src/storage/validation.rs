//! Path validation
//!
//! Handles filename sanitization and the checks that keep every storage path
//! a direct child of the storage root.

use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Device names Windows resolves regardless of directory or extension.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "CONIN$",
    "CONOUT$",
];

/// Turn a client-supplied filename into one that is safe to store.
///
/// Characters are decomposed first so accented letters keep their base
/// letter, then non-ASCII characters are dropped, both path separators become whitespace,
/// whitespace runs are joined with `_`, anything outside `[A-Za-z0-9_.-]` is
/// removed, and leading/trailing dots and underscores are trimmed. The result
/// may be empty; it never contains a separator.
pub fn secure_filename(raw: &str) -> String {
    let ascii: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if is_windows_device_name(trimmed) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

fn is_windows_device_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or_default();
    !stem.is_empty()
        && WINDOWS_DEVICE_NAMES
            .iter()
            .any(|device| device.eq_ignore_ascii_case(stem))
}

/// Check that a name denotes exactly one entry directly below a directory.
///
/// Rejects empty names, `.`/`..`, separators, drive prefixes and NUL bytes.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0', ':']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Split a filename at its last dot into base and extension (dot included).
///
/// A name without a dot, or whose only dot is the first character, has an
/// empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Lowercased text after the last dot, if there is one
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_strips_traversal() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(secure_filename("/absolute/report.pdf"), "absolute_report.pdf");
    }

    #[test]
    fn secure_filename_cleans_characters() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("C:\\Users\\me\\notes.txt"), "C_Users_me_notes.txt");
        assert_eq!(secure_filename("bad\0name.txt"), "badname.txt");
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename("  .hidden.txt"), "hidden.txt");
    }

    #[test]
    fn secure_filename_keeps_base_letters() {
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("Übersicht März.xlsx"), "Ubersicht_Marz.xlsx");
        assert_eq!(secure_filename("ﬁle.txt"), "file.txt");
        assert_eq!(secure_filename("日本.txt"), "txt");
    }

    #[test]
    fn secure_filename_guards_device_names() {
        assert_eq!(secure_filename("con.txt"), "_con.txt");
        assert_eq!(secure_filename("NUL"), "_NUL");
        assert_eq!(secure_filename("console.txt"), "console.txt");
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("report.pdf"));
        assert!(is_plain_file_name("my file.txt"));
        assert!(is_plain_file_name("a..b.txt"));

        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../secret.txt"));
        assert!(!is_plain_file_name("dir/file.txt"));
        assert!(!is_plain_file_name("dir\\file.txt"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("C:evil.txt"));
        assert!(!is_plain_file_name("nul\0byte.txt"));
    }

    #[test]
    fn extension_splitting() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".profile"), (".profile", ""));

        assert_eq!(extension_of("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing.").as_deref(), Some(""));
    }
}
