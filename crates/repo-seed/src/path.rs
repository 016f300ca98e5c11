use std::path::Path;

/// Normalize a relative filesystem path into a remote store key.
///
/// Components are joined with forward slashes regardless of the host
/// separator, and literal backslashes inside a component are flattened
/// too, so a key never carries Windows separators. The relative path is
/// the unique key identifying a file both locally and remotely.
///
/// Returns `None` when any component is not valid UTF-8. A lossy
/// conversion would map two distinct on-disk names to the same key, so
/// such paths get no key at all and callers surface them instead.
pub fn normalize_relative(relative: &Path) -> Option<String> {
    let mut components = Vec::new();
    for c in relative.components() {
        components.push(c.as_os_str().to_str()?);
    }

    Some(components.join("/").replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn single_component_passes_through() {
        assert_eq!(
            normalize_relative(Path::new("a.txt")).as_deref(),
            Some("a.txt")
        );
    }

    #[test]
    fn nested_path_uses_forward_slashes() {
        assert_eq!(
            normalize_relative(Path::new("b").join("c.txt").as_path()).as_deref(),
            Some("b/c.txt")
        );
    }

    #[test]
    fn windows_style_separators_become_forward_slashes() {
        // On Unix hosts a backslash is an ordinary filename character, so
        // this arrives as a single component and still must normalize.
        assert_eq!(
            normalize_relative(Path::new("sub\\file.txt")).as_deref(),
            Some("sub/file.txt")
        );
    }

    #[test]
    fn deeply_nested_path() {
        let path = Path::new("src").join("engine").join("mod.rs");
        assert_eq!(normalize_relative(&path).as_deref(), Some("src/engine/mod.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_component_gets_no_key() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        // Two distinct byte sequences that a lossy conversion would both
        // render as "a\u{FFFD}.txt" and therefore collapse to one key.
        let first = OsString::from_vec(b"a\xff.txt".to_vec());
        let second = OsString::from_vec(b"a\xfe.txt".to_vec());
        assert_eq!(normalize_relative(Path::new(&first)), None);
        assert_eq!(normalize_relative(Path::new(&second)), None);
    }
}
