use std::collections::HashSet;
use std::path::{self, Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct Collection {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Lists every regular file below each root, in root order.
///
/// Roots that are not existing directories end up in `missing`; entries that
/// can't be read mid-walk are logged and skipped.
pub fn collect<P: AsRef<Path>>(roots: &[P], follow_links: bool) -> Collection {
    let mut collection = Collection::default();
    let mut seen = HashSet::new();

    for root in roots {
        let root = root.as_ref();
        if !root.is_dir() {
            collection.missing.push(root.to_owned());
            continue;
        }

        let before = collection.files.len();
        for entry in WalkDir::new(root).follow_links(follow_links) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let key = path::absolute(entry.path()).unwrap_or_else(|_| entry.path().to_owned());
            if seen.insert(key) {
                collection.files.push(entry.into_path());
            }
        }
        log::debug!(
            "{} -> {} files",
            root.display(),
            collection.files.len() - before
        );
    }

    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"x").unwrap();
        }
        dir
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        let mut names: Vec<String> = files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn lists_files_recursively_without_directories() {
        let a = tree(&["one.jpg", "sub/two.png", "sub/deeper/three.mp4"]);
        fs::create_dir_all(a.path().join("empty")).unwrap();

        let collection = collect(&[a.path()], false);

        assert_eq!(
            names(&collection.files, a.path()),
            ["one.jpg", "sub/deeper/three.mp4", "sub/two.png"]
        );
        assert!(collection.missing.is_empty());
    }

    #[test]
    fn missing_root_is_reported_once_and_skipped() {
        let a = tree(&["1.jpg", "2.jpg", "3.jpg"]);
        let b = a.path().join("B");

        let collection = collect(&[a.path().to_owned(), b.clone()], false);

        assert_eq!(collection.files.len(), 3);
        assert_eq!(collection.missing, vec![b]);
    }

    #[test]
    fn a_plain_file_is_not_a_folder() {
        let a = tree(&["note.txt"]);
        let file = a.path().join("note.txt");

        let collection = collect(&[&file], false);

        assert!(collection.files.is_empty());
        assert_eq!(collection.missing, vec![file]);
    }

    #[test]
    fn union_of_roots_in_argument_order() {
        let a = tree(&["a1", "a2"]);
        let b = tree(&["b1"]);

        let collection = collect(&[b.path(), a.path()], false);

        assert_eq!(collection.files.len(), 3);
        assert!(collection.files[0].starts_with(b.path()));
        assert!(collection.files[1..].iter().all(|f| f.starts_with(a.path())));
    }

    #[test]
    fn overlapping_roots_do_not_duplicate() {
        let a = tree(&["top.jpg", "sub/inner.jpg"]);

        let collection = collect(&[a.path().to_owned(), a.path().join("sub"), a.path().to_owned()], false);

        assert_eq!(names(&collection.files, a.path()), ["sub/inner.jpg", "top.jpg"]);
    }

    #[test]
    fn nothing_found_in_empty_folders() {
        let a = TempDir::new().unwrap();
        let collection = collect(&[a.path()], false);
        assert!(collection.files.is_empty());
        assert!(collection.missing.is_empty());
    }
}
