// TourBox Port Discovery
// Finds the controller's serial device under /dev by name prefix

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::TransportError;

/// Device name prefixes, most specific first
#[cfg(target_os = "macos")]
pub const PORT_PREFIXES: &[&str] = &["tty.usbmodemTourBox", "tty.usbmodemSN", "tty.usbmodem"];

/// Device name prefixes, most specific first
#[cfg(not(target_os = "macos"))]
pub const PORT_PREFIXES: &[&str] = &["ttyACM"];

/// Entries of `dir` matching any prefix, grouped by prefix priority and
/// sorted by name within each group. A path matching several prefixes is
/// listed once, under its best one.
pub fn candidate_ports(dir: &Path, prefixes: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut found = Vec::new();
    for prefix in prefixes {
        for name in &names {
            let path = dir.join(name);
            if name.starts_with(prefix) && !found.contains(&path) {
                found.push(path);
            }
        }
    }
    Ok(found)
}

/// First matching port in `dir`
pub fn find_port_in(dir: &Path, prefixes: &[&str]) -> Result<PathBuf, TransportError> {
    let searched = || {
        prefixes
            .iter()
            .map(|p| dir.join(format!("{p}*")).display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let candidates = candidate_ports(dir, prefixes)?;
    log::debug!("Port candidates: {:?}", candidates);
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::NotFound(searched()))
}

/// First matching port under /dev for this platform
pub fn find_port() -> Result<PathBuf, TransportError> {
    find_port_in(Path::new("/dev"), PORT_PREFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_prefix_priority_beats_name_order() {
        let prefixes = ["tty.usbmodemTourBox", "tty.usbmodemSN", "tty.usbmodem"];
        let dir = dev_dir(&[
            "tty.usbmodem1101",
            "tty.usbmodemSN0001",
            "tty.usbmodemTourBox2",
            "tty.Bluetooth",
        ]);

        let found = candidate_ports(dir.path(), &prefixes).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["tty.usbmodemTourBox2", "tty.usbmodemSN0001", "tty.usbmodem1101"]
        );
        assert_eq!(
            find_port_in(dir.path(), &prefixes).unwrap(),
            dir.path().join("tty.usbmodemTourBox2")
        );
    }

    #[test]
    fn test_sorted_within_prefix() {
        let dir = dev_dir(&["ttyACM1", "ttyS0", "ttyACM0"]);
        assert_eq!(
            find_port_in(dir.path(), &["ttyACM"]).unwrap(),
            dir.path().join("ttyACM0")
        );
    }

    #[test]
    fn test_no_match_is_not_found() {
        let dir = dev_dir(&["ttyS0", "null"]);
        let err = find_port_in(dir.path(), &["ttyACM"]).unwrap_err();
        match err {
            TransportError::NotFound(searched) => assert!(searched.contains("ttyACM*")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
