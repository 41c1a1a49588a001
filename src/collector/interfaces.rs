//! Physical-interface enumeration from the sysfs net class directory.
//!
//! Every entry in `/sys/class/net` is a symlink into the device tree;
//! software-only interfaces (lo, bridges, veth pairs) resolve through a
//! `virtual` path segment and are excluded. Ordering follows the directory
//! listing and is unspecified — callers must not depend on it.

use std::io;
use std::path::Path;

use regex::Regex;

use crate::collector::traits::FileSystem;

/// Returns the names of physical interfaces under `root`, lazily filtered.
///
/// An entry qualifies if it is a symlink whose target has no `virtual`
/// segment and, when `pattern` is set, its name matches the pattern.
/// Errors only if `root` itself is unreadable; that is fatal for the
/// process since no interface can ever be found.
pub fn physical_interfaces<'a, F: FileSystem>(
    fs: &'a F,
    root: &Path,
    pattern: Option<&'a Regex>,
) -> io::Result<impl Iterator<Item = String> + 'a> {
    let entries = fs.read_dir(root)?;
    Ok(entries.into_iter().filter_map(move |path| {
        let name = path.file_name()?.to_str()?.to_string();
        // Non-symlink entries (e.g. bonding_masters) are not devices.
        let target = fs.read_link(&path).ok()?;
        if is_virtual(&target) {
            return None;
        }
        match pattern {
            Some(re) if !re.is_match(&name) => None,
            _ => Some(name),
        }
    }))
}

/// A symlink target with a `virtual` segment names a software-only device.
fn is_virtual(target: &Path) -> bool {
    target.components().any(|c| c.as_os_str() == "virtual")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::filter::anchored;
    use crate::collector::mock::MockFs;

    const ROOT: &str = "/sys/class/net";

    fn populated_fs() -> MockFs {
        let mut fs = MockFs::new();
        fs.add_device(ROOT, "eth0", "../../devices/pci0000:00/0000:00:1f.6/net/eth0");
        fs.add_device(ROOT, "eth1", "../../devices/pci0000:00/0000:00:1f.7/net/eth1");
        fs.add_device(ROOT, "lo", "../../devices/virtual/net/lo");
        fs.add_plain_entry(ROOT, "bonding_masters");
        fs
    }

    fn collect<F: FileSystem>(fs: &F, pattern: Option<&Regex>) -> Vec<String> {
        let mut names: Vec<String> = physical_interfaces(fs, Path::new(ROOT), pattern)
            .unwrap()
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_virtual_devices_excluded() {
        let fs = populated_fs();
        assert_eq!(collect(&fs, None), vec!["eth0", "eth1"]);
    }

    #[test]
    fn test_virtual_excluded_even_with_match_all_pattern() {
        let fs = populated_fs();
        let re = anchored(".*").unwrap();
        assert_eq!(collect(&fs, Some(&re)), vec!["eth0", "eth1"]);
    }

    #[test]
    fn test_pattern_filters_names() {
        let fs = populated_fs();
        let re = anchored("eth1").unwrap();
        assert_eq!(collect(&fs, Some(&re)), vec!["eth1"]);
    }

    #[test]
    fn test_unreadable_root_is_an_error() {
        let fs = MockFs::new();
        assert!(physical_interfaces(&fs, Path::new("/missing"), None).is_err());
    }
}
