use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Creates a temporary submission directory populated with `files`
/// (relative path, contents). Parent directories are created as needed.
///
/// Keep the returned `TempDir` in scope for as long as you need the files.
pub fn setup_handin_dir(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().expect("failed to create tempdir");
    for (rel, contents) in files {
        write_file(tmp.path(), rel, contents);
    }
    tmp
}

/// Write `contents` to `root/rel`, creating parents.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    fs::write(&path, contents).expect("failed to write test file");
}
