// TourBox Profile Paths
// Resolves a --profile argument to a file

use std::path::{Path, PathBuf};

/// Extensions tried for bare profile names, in order
const PROFILE_EXTENSIONS: &[&str] = &["json", "toml"];

/// Per-user profile directory (~/.config/tourbox/profiles on Linux)
pub fn profiles_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tourbox").join("profiles"))
}

/// Resolve a profile argument.
///
/// An existing path is used as-is. A bare name (no separator, no extension)
/// is looked up in [`profiles_dir`]. Otherwise the argument is returned
/// unchanged so the load reports the missing file.
pub fn resolve_profile(arg: &Path) -> PathBuf {
    match profiles_dir() {
        Some(dir) => resolve_profile_in(arg, &dir),
        None => arg.to_path_buf(),
    }
}

/// [`resolve_profile`] against an explicit profile directory
pub fn resolve_profile_in(arg: &Path, dir: &Path) -> PathBuf {
    if arg.exists() {
        return arg.to_path_buf();
    }

    let is_bare = arg.components().count() == 1 && arg.extension().is_none();
    if is_bare {
        for ext in PROFILE_EXTENSIONS {
            let candidate = dir.join(arg).with_extension(ext);
            if candidate.is_file() {
                log::debug!("Resolved profile '{}' to {}", arg.display(), candidate.display());
                return candidate;
            }
        }
    }

    arg.to_path_buf()
}
