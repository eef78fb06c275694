use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;

lazy_static! {
    /// `values` or `values-<qualifiers>`, e.g. `values-fr-rCA`, `values-night-v31`.
    static ref VALUES_DIR: Regex = Regex::new(r"^values(-[A-Za-z0-9_+-]+)?$").unwrap();
}

/// Whether `path` looks like `<resource_dir>/values*/<file>.xml`.
pub fn is_values_resource(path: &Path, resource_dir: &str) -> bool {
    let is_xml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
    if !is_xml {
        return false;
    }
    let Some(values_dir) = path.parent() else {
        return false;
    };
    let values_ok = values_dir
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| VALUES_DIR.is_match(n));
    let res_ok = values_dir
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == resource_dir);
    values_ok && res_ok
}

fn build_file_name_filter(include: &[String]) -> Result<Option<GlobSet>, String> {
    if include.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in include {
        let glob = Glob::new(pat).map_err(|e| format!("Invalid glob pattern '{}': {}", pat, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| format!("Failed to build glob set: {}", e))
}

/// Find candidate values resources under each root.
///
/// Roots are walked in parallel; `.gitignore` rules are honoured and hidden
/// directories are included. `include` optionally restricts file names
/// (e.g. `values.xml`, `strings*.xml`). Results are sorted and deduplicated.
pub fn find_values_resources(
    roots: &[PathBuf],
    resource_dir: &str,
    include: &[String],
) -> Result<Vec<PathBuf>, String> {
    for root in roots {
        if !root.is_dir() {
            return Err(format!("Not a directory: {}", root.display()));
        }
    }
    let file_names = build_file_name_filter(include)?;

    let collected: Vec<PathBuf> = roots
        .par_iter()
        .map(|root| {
            let mut out = Vec::new();
            let walker = WalkBuilder::new(root)
                .git_ignore(true)
                .git_exclude(true)
                .hidden(false)
                .ignore(true)
                .parents(true)
                .build();

            for dent in walker {
                let dent = match dent {
                    Ok(d) => d,
                    Err(e) => {
                        log::debug!("skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                if !dent.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = dent.path();
                if !is_values_resource(path, resource_dir) {
                    continue;
                }
                let name_ok = match (&file_names, path.file_name()) {
                    (Some(set), Some(name)) => set.is_match(name),
                    (Some(_), None) => false,
                    (None, _) => true,
                };
                if name_ok {
                    out.push(path.to_path_buf());
                }
            }
            out
        })
        .flatten()
        .collect();

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut results: Vec<PathBuf> = collected
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect();
    results.sort();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_values_resource() {
        assert!(is_values_resource(Path::new("lib/res/values/values.xml"), "res"));
        assert!(is_values_resource(Path::new("res/values-fr-rCA/strings.xml"), "res"));
        assert!(is_values_resource(Path::new("res/values-b+sr+Latn/strings.XML"), "res"));
        assert!(!is_values_resource(Path::new("res/layout/main.xml"), "res"));
        assert!(!is_values_resource(Path::new("res/values/strings.json"), "res"));
        assert!(!is_values_resource(Path::new("src/values/strings.xml"), "res"));
        assert!(!is_values_resource(Path::new("res/valuesfoo/strings.xml"), "res"));
        assert!(is_values_resource(Path::new("resources/values/a.xml"), "resources"));
    }

    #[test]
    fn test_find_values_resources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for rel in [
            "aar/res/values/values.xml",
            "aar/res/values-de/values-de.xml",
            "aar/res/drawable/icon.xml",
            "aar/AndroidManifest.xml",
            "other/res/values-night/colors.xml",
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "<resources/>").unwrap();
        }

        let found = find_values_resources(&[root.to_path_buf()], "res", &[]).unwrap();
        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            rel,
            vec![
                "aar/res/values/values.xml",
                "aar/res/values-de/values-de.xml",
                "other/res/values-night/colors.xml",
            ]
        );

        let only_values =
            find_values_resources(&[root.to_path_buf()], "res", &["values.xml".to_string()])
                .unwrap();
        assert_eq!(only_values.len(), 1);
        assert!(only_values[0].ends_with("res/values/values.xml"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = find_values_resources(&[PathBuf::from("/nonexistent/root")], "res", &[])
            .unwrap_err();
        assert!(err.contains("Not a directory"));
    }

    #[test]
    fn test_invalid_include_glob() {
        let temp_dir = TempDir::new().unwrap();
        let err = find_values_resources(&[temp_dir.path().to_path_buf()], "res", &["[".to_string()])
            .unwrap_err();
        assert!(err.contains("Invalid glob pattern"));
    }
}
