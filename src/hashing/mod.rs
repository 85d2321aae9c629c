//! BLAKE3 content fingerprints used as cache keys.
//!
//! Three kinds of fingerprints exist, one per cache category:
//!
//! - **Folder fingerprints** hash the sorted `(file name, content hash)` pairs
//!   of every file under a document folder, so adding, removing, or editing
//!   any file produces a different fingerprint.
//! - **Query fingerprints** hash a normalized form of a search query
//!   (lowercased, whitespace collapsed) so trivially reformatted queries
//!   share an entry.
//! - Analysis entries are keyed directly by opportunity id and need no
//!   hashing here.

use std::fs;
use std::io;
use std::path::Path;

use blake3::Hasher;

/// Hex-encoded 256-bit BLAKE3 hash of raw bytes.
#[inline]
pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Fingerprint for a search query.
///
/// The query is lowercased and its whitespace collapsed to single spaces
/// before hashing.
pub fn fingerprint_query(query: &str) -> String {
    let normalized = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    hash_bytes(normalized.as_bytes())
}

/// Fingerprint for a document folder.
///
/// Every file under `folder` (recursively) contributes a
/// `(relative path, content hash)` pair; pairs are sorted by path and the
/// concatenation is hashed. Deterministic regardless of directory iteration
/// order.
pub fn fingerprint_folder(folder: &Path) -> io::Result<String> {
    let mut pairs = Vec::new();
    collect_file_hashes(folder, folder, &mut pairs)?;
    pairs.sort();

    let mut hasher = Hasher::new();
    for (name, hash) in &pairs {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(hash.as_bytes());
        hasher.update(b"|");
    }
    Ok(hasher.finalize().to_hex().to_string())
}

fn collect_file_hashes(
    root: &Path,
    dir: &Path,
    pairs: &mut Vec<(String, String)>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_file_hashes(root, &path, pairs)?;
        } else if path.is_file() {
            let bytes = fs::read(&path)?;
            let name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            pairs.push((name, hash_bytes(&bytes)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content).unwrap();
    }

    #[test]
    fn test_folder_fingerprint_determinism() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.pdf", b"alpha");
        write_file(dir.path(), "b.xlsx", b"beta");

        let fp1 = fingerprint_folder(dir.path()).unwrap();
        let fp2 = fingerprint_folder(dir.path()).unwrap();

        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_folder_fingerprint_changes_on_edit() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.pdf", b"alpha");

        let before = fingerprint_folder(dir.path()).unwrap();
        write_file(dir.path(), "a.pdf", b"alpha v2");
        let after = fingerprint_folder(dir.path()).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_folder_fingerprint_changes_on_add_and_remove() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.pdf", b"alpha");

        let one = fingerprint_folder(dir.path()).unwrap();

        write_file(dir.path(), "b.pdf", b"beta");
        let two = fingerprint_folder(dir.path()).unwrap();
        assert_ne!(one, two);

        fs::remove_file(dir.path().join("b.pdf")).unwrap();
        let back = fingerprint_folder(dir.path()).unwrap();
        assert_eq!(one, back);
    }

    #[test]
    fn test_folder_fingerprint_sees_nested_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.pdf", b"alpha");

        let flat = fingerprint_folder(dir.path()).unwrap();
        write_file(dir.path(), "sub/c.docx", b"gamma");
        let nested = fingerprint_folder(dir.path()).unwrap();

        assert_ne!(flat, nested);
    }

    #[test]
    fn test_folder_fingerprint_name_sensitivity() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        write_file(dir_a.path(), "a.pdf", b"same");
        write_file(dir_b.path(), "b.pdf", b"same");

        let fp_a = fingerprint_folder(dir_a.path()).unwrap();
        let fp_b = fingerprint_folder(dir_b.path()).unwrap();

        assert_ne!(fp_a, fp_b);
    }

    #[test]
    fn test_empty_folder_fingerprint_is_stable() {
        let dir = TempDir::new().unwrap();
        let fp1 = fingerprint_folder(dir.path()).unwrap();
        let fp2 = fingerprint_folder(dir.path()).unwrap();
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_query_fingerprint_normalization() {
        let base = fingerprint_query("saudi arabia it salaries 2025");

        assert_eq!(base, fingerprint_query("Saudi  Arabia IT salaries 2025"));
        assert_eq!(base, fingerprint_query("  saudi arabia\nit salaries 2025 "));
        assert_ne!(base, fingerprint_query("saudi arabia it salaries 2024"));
    }

    #[test]
    fn test_query_fingerprint_unicode() {
        let ar = fingerprint_query("منافسات حكومية سعودية");
        let en = fingerprint_query("saudi government tenders");
        assert_ne!(ar, en);
        assert_eq!(ar, fingerprint_query("منافسات  حكومية سعودية"));
    }
}
