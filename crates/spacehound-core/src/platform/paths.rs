/// Path utilities — normalisation, extended-length prefixing and reparse
/// point detection.
///
/// Every filesystem call the scanner makes goes through
/// [`extended_length`] so that deep trees are never silently truncated by
/// the traditional `MAX_PATH` ceiling on Windows.
use std::borrow::Cow;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The traditional Windows path-length ceiling.
pub const MAX_PATH: usize = 260;

const VERBATIM_PREFIX: &str = r"\\?\";
const VERBATIM_UNC_PREFIX: &str = r"\\?\UNC\";

/// Make `path` absolute and lexically remove `.` and `..` components.
///
/// Symlinks are not resolved: the scanner reports paths as the user sees
/// them, and a `..` after a link is collapsed textually.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::with_capacity(absolute.as_os_str().len());
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Rewrite `path` into the Windows extended-length form (`\\?\`) when it
/// reaches [`MAX_PATH`].
///
/// Already-prefixed paths pass through untouched; UNC paths become
/// `\\?\UNC\server\share\...`. Works on any platform so the rule can be
/// exercised everywhere, but only Windows callers apply it.
pub fn prefix_long_path(path: &str) -> Cow<'_, str> {
    if path.len() < MAX_PATH || path.starts_with(VERBATIM_PREFIX) {
        return Cow::Borrowed(path);
    }
    match path.strip_prefix(r"\\") {
        Some(unc) => Cow::Owned(format!("{VERBATIM_UNC_PREFIX}{unc}")),
        None => Cow::Owned(format!("{VERBATIM_PREFIX}{path}")),
    }
}

/// The form of `path` to hand to the OS.
#[cfg(windows)]
pub fn extended_length(path: &Path) -> Cow<'_, Path> {
    match path.to_str() {
        Some(s) => match prefix_long_path(s) {
            Cow::Borrowed(_) => Cow::Borrowed(path),
            Cow::Owned(long) => Cow::Owned(PathBuf::from(long)),
        },
        None => {
            // Unpaired surrogates: decide on the lossy form, prefix the real one.
            let lossy = path.to_string_lossy();
            if lossy.len() >= MAX_PATH && !lossy.starts_with(VERBATIM_PREFIX) {
                let mut long = std::ffi::OsString::from(VERBATIM_PREFIX);
                long.push(path.as_os_str());
                Cow::Owned(PathBuf::from(long))
            } else {
                Cow::Borrowed(path)
            }
        }
    }
}

/// The form of `path` to hand to the OS. Other platforms have no
/// `MAX_PATH` ceiling, so the path is used as-is.
#[cfg(not(windows))]
pub fn extended_length(path: &Path) -> Cow<'_, Path> {
    Cow::Borrowed(path)
}

/// `true` if `path` is a junction, symlink or other reparse point.
///
/// A failed attribute query reports `false`: the entry is then traversed,
/// favouring completeness over cycle avoidance.
#[cfg(windows)]
pub fn is_reparse_point(path: &Path) -> bool {
    use std::os::windows::ffi::OsStrExt;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        GetFileAttributesW, FILE_ATTRIBUTE_REPARSE_POINT, INVALID_FILE_ATTRIBUTES,
    };

    let long = extended_length(path);
    let wide: Vec<u16> = long
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    let attrs = unsafe { GetFileAttributesW(PCWSTR(wide.as_ptr())) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        tracing::debug!("GetFileAttributesW failed for {}", path.display());
        return false;
    }
    attrs & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0
}

/// `true` if `path` is a symbolic link.
///
/// A failed `lstat` reports `false`: the entry is then traversed,
/// favouring completeness over cycle avoidance.
#[cfg(not(windows))]
pub fn is_reparse_point(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Display name for an entry at `path`: its last component, or the whole
/// path for roots such as `/` or `C:\`.
pub fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            let s = path.to_string_lossy();
            let trimmed = s.trim_end_matches(['\\', '/']);
            if trimmed.is_empty() {
                s.into_owned()
            } else {
                trimmed.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_paths_are_untouched() {
        assert!(matches!(
            prefix_long_path(r"C:\Users\me"),
            Cow::Borrowed(r"C:\Users\me")
        ));
    }

    #[test]
    fn test_long_drive_path_gets_verbatim_prefix() {
        let long = format!(r"C:\{}", "d".repeat(MAX_PATH));
        assert_eq!(prefix_long_path(&long), format!(r"\\?\{long}"));
    }

    #[test]
    fn test_prefix_applies_exactly_at_max_path() {
        let at_limit = format!(r"C:\{}", "x".repeat(MAX_PATH - 3));
        assert_eq!(at_limit.len(), MAX_PATH);
        assert!(prefix_long_path(&at_limit).starts_with(VERBATIM_PREFIX));

        let below = &at_limit[..MAX_PATH - 1];
        assert_eq!(prefix_long_path(below), below);
    }

    #[test]
    fn test_long_unc_path_gets_unc_prefix() {
        let long = format!(r"\\server\share\{}", "u".repeat(MAX_PATH));
        let extended = prefix_long_path(&long);
        assert!(extended.starts_with(r"\\?\UNC\server\share\"));
    }

    #[test]
    fn test_already_prefixed_path_is_kept() {
        let long = format!(r"\\?\C:\{}", "p".repeat(MAX_PATH));
        assert_eq!(prefix_long_path(&long), long);
    }

    #[test]
    fn test_normalize_collapses_dots() {
        let base = std::env::temp_dir();
        let messy = base.join("a").join(".").join("b").join("..").join("c");
        assert_eq!(normalize(&messy).unwrap(), base.join("a").join("c"));
    }

    #[test]
    fn test_normalize_makes_relative_absolute() {
        let normalized = normalize(Path::new("some/relative")).unwrap();
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("some/relative"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/var/log")), "log");
        assert_eq!(display_name(Path::new("/")), "/");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_reparse_point() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir(&target).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(is_reparse_point(&link));
        assert!(!is_reparse_point(&target));
        assert!(!is_reparse_point(&tmp.path().join("missing")));
    }
}
