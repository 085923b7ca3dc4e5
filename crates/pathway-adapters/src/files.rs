//! Helpers de archivos DOT dentro del directorio de trabajo keyado por EOI.

use std::fs;
use std::path::{Path, PathBuf};

use pathway_domain::DomainError;

/// Lista los archivos `<prefix>-<n>.dot` de un directorio, ordenados por su
/// número. El número es el sufijo entre el último guion y la extensión.
pub fn numbered_dot_files(dir: &Path, prefix: &str) -> Result<Vec<(u64, PathBuf)>, DomainError> {
    let mut found: Vec<(u64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(n) => n,
            None => continue,
        };
        if !name.ends_with(".dot") {
            continue;
        }
        let stem = &name[..name.len() - ".dot".len()];
        let dash = match stem.rfind('-') {
            Some(pos) => pos,
            None => continue,
        };
        if &stem[..dash] != prefix {
            continue;
        }
        let number = match stem[dash + 1..].parse::<u64>() {
            Ok(n) => n,
            Err(_) => continue,
        };
        found.push((number, entry.path()));
    }
    found.sort_by_key(|(number, _)| *number);
    Ok(found)
}

/// Lista todos los archivos `.dot` de un directorio, en orden de nombre.
pub fn dot_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut found: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) == Some("dot") {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kpw-files-{}-{}", tag, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    #[test]
    fn numbered_files_come_back_sorted() {
        let dir = scratch_dir("sorted");
        for n in [3u64, 1, 10, 2] {
            fs::write(dir.join(format!("causalcore-{}.dot", n)), "digraph G{}").unwrap();
        }
        fs::write(dir.join("core-1.dot"), "digraph G{}").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let files = numbered_dot_files(&dir, "causalcore").expect("scan");
        let numbers: Vec<u64> = files.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3, 10]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn prefix_must_match_exactly() {
        let dir = scratch_dir("prefix");
        fs::write(dir.join("eventpath-1.dot"), "digraph G{}").unwrap();
        fs::write(dir.join("path-2.dot"), "digraph G{}").unwrap();
        let files = numbered_dot_files(&dir, "eventpath").expect("scan");
        assert_eq!(files.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}
