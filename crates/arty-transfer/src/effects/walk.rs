use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{CompiledPattern, split_wildcard_root};
use crate::data::PathPattern;
use crate::error::Result;

/// A matched local file: its filesystem path and the path relative to the
/// pattern's root that target resolution operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LocalCandidate {
    pub path: PathBuf,
    pub rel: String,
}

/// Resolve an upload expression into an ordered list of local files.
///
/// Wildcard mode anchors the walk at the longest literal directory prefix;
/// regex mode walks from the current directory and matches the whole
/// expression. Entries are visited in sorted order so discovery order is
/// deterministic. A missing root or zero matches yields an empty list, not
/// an error.
pub(crate) fn collect_upload_candidates(pattern: &PathPattern) -> Result<Vec<LocalCandidate>> {
    let (root, expr) = if pattern.regex {
        (String::new(), pattern.raw.clone())
    } else {
        split_wildcard_root(&pattern.raw)
    };
    let compiled = CompiledPattern::compile_expr(&expr, pattern)?;

    let root_dir = if root.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(&root)
    };
    if !root_dir.is_dir() {
        tracing::warn!(root = %root_dir.display(), "pattern root is not a directory");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    visit(&root_dir, "", pattern.recursive, &compiled, &mut out)?;
    out.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(out)
}

fn visit(
    dir: &Path,
    rel_prefix: &str,
    recursive: bool,
    compiled: &CompiledPattern,
    out: &mut Vec<LocalCandidate>,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = if rel_prefix.is_empty() {
            name
        } else {
            format!("{rel_prefix}/{name}")
        };
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if recursive {
                visit(&entry.path(), &rel, recursive, compiled, out)?;
            }
        } else if file_type.is_file() && compiled.matches(&rel) {
            out.push(LocalCandidate {
                path: entry.path(),
                rel,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn rels(candidates: &[LocalCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.rel.as_str()).collect()
    }

    #[test]
    fn wildcard_walk_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.zip"));
        touch(&dir.path().join("a.zip"));
        touch(&dir.path().join("sub/c.zip"));
        touch(&dir.path().join("sub/d.txt"));

        let raw = format!("{}/*.zip", dir.path().display());
        let pattern = PathPattern::wildcard(raw, true);
        let found = collect_upload_candidates(&pattern).unwrap();
        assert_eq!(rels(&found), vec!["a.zip", "b.zip", "sub/c.zip"]);
    }

    #[test]
    fn non_recursive_stays_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.zip"));
        touch(&dir.path().join("sub/c.zip"));

        let raw = format!("{}/*.zip", dir.path().display());
        let pattern = PathPattern::wildcard(raw, false);
        let found = collect_upload_candidates(&pattern).unwrap();
        assert_eq!(rels(&found), vec!["a.zip"]);
    }

    #[test]
    fn zero_matches_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"));

        let raw = format!("{}/*.zip", dir.path().display());
        let pattern = PathPattern::wildcard(raw, true);
        assert!(collect_upload_candidates(&pattern).unwrap().is_empty());
    }

    #[test]
    fn missing_root_yields_empty() {
        let pattern = PathPattern::wildcard("/nonexistent-root-dir/*.zip", true);
        assert!(collect_upload_candidates(&pattern).unwrap().is_empty());
    }
}
