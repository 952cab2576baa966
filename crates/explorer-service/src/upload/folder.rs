//! Folder structure reconstruction for drag-and-drop uploads.

use explorer_entity::upload::{DroppedEntry, PendingFile};

/// Flattens dropped entries into pending files.
///
/// Each file's relative path is built by prepending the names of the
/// directories above it, so a dropped `world` folder yields paths such as
/// `world/region/r.0.0.mca`. Top-level files keep their bare name.
pub fn flatten_dropped(entries: Vec<DroppedEntry>) -> Vec<PendingFile> {
    let mut files = Vec::new();
    for entry in entries {
        walk(entry, "", &mut files);
    }
    files
}

fn walk(entry: DroppedEntry, prefix: &str, out: &mut Vec<PendingFile>) {
    match entry {
        DroppedEntry::File { name, data } => {
            out.push(PendingFile::new(format!("{prefix}{name}"), data));
        }
        DroppedEntry::Directory { name, children } => {
            let nested = format!("{prefix}{name}/");
            for child in children {
                walk(child, &nested, out);
            }
        }
    }
}

/// Whether a batch must go to the folder-structure endpoint: true as soon
/// as any relative path carries a directory.
pub fn is_folder_batch(files: &[PendingFile]) -> bool {
    files.iter().any(PendingFile::has_folder_structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str) -> DroppedEntry {
        DroppedEntry::File {
            name: name.to_string(),
            data: Bytes::from_static(b"x"),
        }
    }

    #[test]
    fn test_prepends_ancestor_names() {
        let dropped = vec![
            DroppedEntry::Directory {
                name: "world".into(),
                children: vec![
                    file("level.dat"),
                    DroppedEntry::Directory {
                        name: "region".into(),
                        children: vec![file("r.0.0.mca")],
                    },
                ],
            },
            file("ops.json"),
        ];

        let files = flatten_dropped(dropped);
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["world/level.dat", "world/region/r.0.0.mca", "ops.json"]
        );
        assert!(is_folder_batch(&files));
    }

    #[test]
    fn test_flat_files_are_not_a_folder_batch() {
        let files = flatten_dropped(vec![file("a.txt"), file("b.txt")]);
        assert!(!is_folder_batch(&files));
    }
}
