//! Seed file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{LoadError, LoadResult, RuleFiles};

/// Discovers rule seed files in a directory.
///
/// Looks in `path` itself and then in `path/Snapshot`. The condition and
/// bound files are required; food and guidance files are optional.
pub fn discover_rule_files<P: AsRef<Path>>(path: P) -> LoadResult<RuleFiles> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoadError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let seed_dir = find_seed_dir(path);
    let mut files = RuleFiles::new();

    for entry in fs::read_dir(&seed_dir)? {
        let entry = entry?;
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();

        if !filename_str.ends_with(".txt") {
            continue;
        }

        if filename_str.starts_with("rules_Condition_") {
            files.condition_file = Some(entry.path());
            if let Some(date) = extract_release_date(&filename_str) {
                files.release_date = Some(date);
            }
        } else if filename_str.starts_with("rules_Bound_") {
            files.bound_file = Some(entry.path());
        } else if filename_str.starts_with("rules_Food_") {
            files.food_file = Some(entry.path());
        } else if filename_str.starts_with("rules_Guidance_") {
            files.guidance_file = Some(entry.path());
        }
    }

    if !files.has_required_files() {
        let missing = files.missing_files();
        return Err(LoadError::RequiredFileMissing {
            file_type: missing.join(", "),
            directory: seed_dir.display().to_string(),
        });
    }

    tracing::debug!(
        directory = %seed_dir.display(),
        release = ?files.release_date,
        "discovered rule seed files"
    );

    Ok(files)
}

/// Returns the directory holding the seed files.
fn find_seed_dir(base: &Path) -> PathBuf {
    let snapshot = base.join("Snapshot");
    if snapshot.is_dir() {
        return snapshot;
    }
    base.to_path_buf()
}

/// Extracts the release date from a seed filename.
///
/// Seed files have names like `rules_Condition_20250101.txt`.
pub fn extract_release_date(filename: &str) -> Option<String> {
    let without_ext = filename.trim_end_matches(".txt");
    let last = without_ext.rsplit('_').next()?;

    if last.len() == 8 && last.chars().all(|c| c.is_ascii_digit()) {
        return Some(last.to_string());
    }

    None
}
