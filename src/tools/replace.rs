use crate::{errors::{AppError, AppResult}, sandbox::SandboxedFileSystem};
use serde::Serialize;
use similar::TextDiff;
use std::fmt;
use tracing::{info, warn};

const NO_NEWLINE_HINT: &str = "\n\\ No newline at end of file";

#[derive(Debug, Serialize)]
pub struct ReplaceReport {
    pub search: String,
    pub glob: String,
    pub applied: bool,
    pub modified: Vec<String>,
    pub diffs: Vec<String>,
}

impl fmt::Display for ReplaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modified.is_empty() {
            return write!(f, "No matches found for '{}' in {}", self.search, self.glob);
        }
        if self.applied {
            for file in &self.modified {
                writeln!(f, "Modified: {file}")?;
            }
            write!(f, "{} file(s) updated.", self.modified.len())
        } else {
            write!(
                f,
                "{}\n\nWould modify {} file(s). Use --apply to make changes.",
                self.diffs.join("\n"),
                self.modified.len()
            )
        }
    }
}

/// Replaces every occurrence of `search` in files matching `glob`.
///
/// A dry run (`apply == false`) only computes unified diffs. Files are written
/// one at a time; an interrupted run can leave a subset modified.
pub fn replace(
    fs: &SandboxedFileSystem,
    search: &str,
    replacement: &str,
    glob: &str,
    apply: bool,
) -> AppResult<ReplaceReport> {
    if search.is_empty() {
        return Err(AppError::InvalidArgument("search text must not be empty".into()));
    }
    let mut modified = Vec::new();
    let mut diffs = Vec::new();

    for file in fs.list(glob)? {
        let Ok(original) = String::from_utf8(fs.read(&file)?) else {
            warn!(path = %file, reason = "not valid UTF-8", "skipping file");
            continue;
        };
        if !original.contains(search) {
            continue;
        }
        let updated = original.replace(search, replacement);
        let diff = TextDiff::from_lines(&original, &updated)
            .unified_diff()
            .context_radius(3)
            .header(&file, &file)
            .to_string();
        // plain unified-diff output carries no end-of-file hint lines
        diffs.push(diff.replace(NO_NEWLINE_HINT, ""));
        if apply {
            fs.write(&file, updated.as_bytes())?;
            info!(path = %file, "replaced");
        }
        modified.push(file);
    }

    Ok(ReplaceReport { search: search.to_string(), glob: glob.to_string(), applied: apply, modified, diffs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const ORIGINAL: &str = "print('old_text')\nprint('old_text again')";

    #[test]
    fn dry_run_previews_without_writing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("test.py").write_str(ORIGINAL).unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();

        let report = replace(&fs, "old_text", "new_text", "*.py", false).unwrap();
        tmp.child("test.py").assert(ORIGINAL);

        let out = report.to_string();
        assert!(out.contains("--- test.py"));
        assert!(out.contains("+++ test.py"));
        assert!(out.contains("-print('old_text')"));
        assert!(out.contains("+print('new_text')"));
        assert!(out.ends_with("Would modify 1 file(s). Use --apply to make changes."));
    }

    #[test]
    fn apply_rewrites_files() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("test.py").write_str(ORIGINAL).unwrap();
        tmp.child("other.py").write_str("untouched").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();

        let report = replace(&fs, "old_text", "new_text", "*.py", true).unwrap();
        tmp.child("test.py").assert("print('new_text')\nprint('new_text again')");
        tmp.child("other.py").assert("untouched");
        assert_eq!(report.to_string(), "Modified: test.py\n1 file(s) updated.");
    }

    #[test]
    fn second_apply_reports_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("a.txt").write_str("foo foo").unwrap();
        tmp.child("b.txt").write_str("foo").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();

        assert_eq!(replace(&fs, "foo", "bar", "*.txt", true).unwrap().modified, vec!["a.txt", "b.txt"]);
        let again = replace(&fs, "foo", "bar", "*.txt", true).unwrap();
        assert!(again.modified.is_empty());
        assert_eq!(again.to_string(), "No matches found for 'foo' in *.txt");
    }

    #[test]
    fn no_matches_message() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("test.py").write_str("print('hello')").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        let report = replace(&fs, "nonexistent", "new", "*.py", false).unwrap();
        assert!(report.to_string().starts_with("No matches"));
        tmp.child("test.py").assert("print('hello')");
    }

    #[test]
    fn diff_omits_missing_newline_hint() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("n.txt").write_str("a\nb").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        let report = replace(&fs, "b", "c", "*.txt", false).unwrap();
        assert!(!report.diffs[0].contains("No newline"));
        assert!(report.diffs[0].ends_with(" a\n-b\n+c\n"));
        assert!(report.to_string().contains("+c\n\n\nWould modify 1 file(s)."));
    }

    #[test]
    fn empty_search_rejected() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        assert_eq!(replace(&fs, "", "x", "*", false).unwrap_err().code(), "InvalidArgument");
    }

    #[test]
    fn non_utf8_files_skipped() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("latin1.txt").write_binary(b"caf\xe9 old").unwrap();
        tmp.child("ok.txt").write_str("old").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        let report = replace(&fs, "old", "new", "*.txt", true).unwrap();
        assert_eq!(report.modified, vec!["ok.txt"]);
        tmp.child("latin1.txt").assert(&b"caf\xe9 old"[..]);
    }
}
