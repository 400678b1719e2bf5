use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// List every regular file under `root`, as paths relative to `root`, sorted.
///
/// Hidden entries (names starting with `.`) are skipped, directories included.
pub fn dirtree<P: AsRef<Path>>(root: P) -> io::Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// Lexically normalise a path: drop `.` components and fold `..` where possible.
///
/// Does not touch the filesystem, so it works for paths reported by external tools.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Forward-slash rendering of a relative path, used for module names and reports.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dirtree_lists_relative_sorted_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("run.py"), "").unwrap();
        fs::write(root.join("pkg/b.py"), "").unwrap();
        fs::write(root.join("pkg/a.py"), "").unwrap();
        fs::write(root.join(".git/config"), "").unwrap();
        fs::write(root.join(".hidden.py"), "").unwrap();

        let files = dirtree(root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("pkg/a.py"),
                PathBuf::from("pkg/b.py"),
                PathBuf::from("run.py"),
            ]
        );
    }

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(normalize(Path::new("./a/./b/../c.py")), PathBuf::from("a/c.py"));
        assert_eq!(normalize(Path::new("../x.py")), PathBuf::from("../x.py"));
    }

    #[test]
    fn test_to_slash_joins_components() {
        assert_eq!(to_slash(Path::new("pkg/sub/test_x")), "pkg/sub/test_x");
        assert_eq!(to_slash(Path::new("./test_x")), "test_x");
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing_dirs() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a/b/c.json");
        ensure_parent_dir(&file).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        ensure_parent_dir("plain.json").unwrap();
    }
}
