//! Root-confined file access.
//!
//! Every path handed to [`SandboxedFileSystem`] is untrusted and relative to the
//! root. A path is accepted only when:
//! 1. the final segment, before resolution, is not a symbolic link
//! 2. its canonical form is the root or lies beneath it
//!
//! Intermediate symlinked directories are followed unless the filesystem was
//! built with [`SandboxedFileSystem::reject_intermediate_symlinks`].

use crate::errors::{AppError, AppResult};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SandboxedFileSystem {
    root: PathBuf,
    reject_intermediate_symlinks: bool,
}

impl SandboxedFileSystem {
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        let root = crate::config::canonical_root(root)?;
        if !root.is_dir() {
            anyhow::bail!("sandbox root is not a directory: {}", root.display());
        }
        Ok(Self { root, reject_intermediate_symlinks: false })
    }

    #[must_use]
    pub fn reject_intermediate_symlinks(mut self, reject: bool) -> Self {
        self.reject_intermediate_symlinks = reject;
        self
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Resolves `relative` against the root and returns the canonical path.
    ///
    /// `""` and `"."` resolve to the root itself. With `must_exist` false the
    /// path may be missing; the existing part is canonicalized and the rest is
    /// applied lexically.
    pub fn validate(&self, relative: &str, must_exist: bool) -> AppResult<PathBuf> {
        let joined = self.root.join(relative);
        // components() drops trailing separators and `.`, so `link/` is checked as `link`
        let lexical: PathBuf = joined.components().collect();
        if is_symlink(&lexical) {
            return Err(AppError::SymlinkNotAllowed(relative.to_string()));
        }
        if self.reject_intermediate_symlinks {
            self.check_intermediate(&joined, relative)?;
        }

        let resolved = resolve(&joined, relative)?;
        if !resolved.starts_with(&self.root) {
            warn!(path = relative, resolved = %resolved.display(), "path traversal rejected");
            return Err(AppError::PathTraversal(relative.to_string()));
        }
        if must_exist && !resolved.exists() {
            return Err(AppError::NotFound(relative.to_string()));
        }
        Ok(resolved)
    }

    pub fn read(&self, relative: &str) -> AppResult<Vec<u8>> {
        let path = self.validate(relative, true)?;
        if path.is_dir() {
            return Err(AppError::IsADirectory(relative.to_string()));
        }
        fs::read(&path).map_err(|e| AppError::from_io(e, relative))
    }

    /// Creates or truncates `relative`. The parent directory must already exist.
    pub fn write(&self, relative: &str, content: &[u8]) -> AppResult<()> {
        let path = self.validate(relative, false)?;
        if path.is_dir() {
            return Err(AppError::IsADirectory(relative.to_string()));
        }
        match path.parent() {
            Some(parent) if parent.is_dir() => {}
            _ => return Err(AppError::NotFound(format!("parent directory of {relative}"))),
        }
        fs::write(&path, content).map_err(|e| AppError::from_io(e, relative))?;
        debug!(path = relative, bytes = content.len(), "wrote file");
        Ok(())
    }

    /// Regular files under the root matching `pattern`, as sorted root-relative
    /// paths with `/` separators. Matches whose canonical form escapes the root
    /// are dropped with a warning.
    pub fn list(&self, pattern: &str) -> AppResult<Vec<String>> {
        let pattern = pattern.trim_start_matches("./");
        let as_path = Path::new(pattern);
        if as_path.is_absolute() || as_path.components().any(|c| matches!(c, Component::ParentDir)) {
            warn!(pattern, reason = "pattern leaves root", "glob matches nothing");
            return Ok(Vec::new());
        }
        let matcher = compile_glob(pattern)?;

        let mut found = Vec::new();
        for entry in self.walk(max_depth(pattern)) {
            let Ok(rel) = entry.path().strip_prefix(&self.root) else { continue };
            if !matcher.is_match(rel) {
                continue;
            }
            if entry.path_is_symlink() {
                debug!(path = %rel.display(), "skipping symlink");
                continue;
            }
            let canonical = match dunce::canonicalize(entry.path()) {
                Ok(c) => c,
                Err(err) => {
                    warn!(path = %rel.display(), error = %err, "skipping unresolvable entry");
                    continue;
                }
            };
            if !canonical.starts_with(&self.root) {
                warn!(path = %rel.display(), reason = "outside root", "excluding glob match");
                continue;
            }
            if !canonical.is_file() {
                continue;
            }
            match rel.to_str() {
                Some(s) => found.push(s.replace(std::path::MAIN_SEPARATOR, "/")),
                None => warn!(path = %rel.display(), reason = "non-UTF-8 name", "excluding glob match"),
            }
        }
        found.sort();
        found.dedup();
        Ok(found)
    }

    /// Rejects a symlink at any component below the root, including ones
    /// reached again after `..` climbs out of it.
    fn check_intermediate(&self, joined: &Path, relative: &str) -> AppResult<()> {
        let mut cur = PathBuf::new();
        for comp in joined.components() {
            match comp {
                Component::Prefix(_) | Component::RootDir => cur.push(comp.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    cur.pop();
                }
                Component::Normal(name) => {
                    cur.push(name);
                    if cur.starts_with(&self.root) && cur != self.root && is_symlink(&cur) {
                        return Err(AppError::SymlinkNotAllowed(relative.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Entries under the root for a glob walk. Symlinks resolving outside the
    /// root are pruned before the walk can descend into them.
    pub(crate) fn walk(&self, depth: Option<usize>) -> impl Iterator<Item = DirEntry> + '_ {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(!self.reject_intermediate_symlinks);
        if let Some(depth) = depth {
            walker = walker.max_depth(depth);
        }
        walker
            .into_iter()
            .filter_entry(move |entry| self.stays_inside(entry))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
    }

    fn stays_inside(&self, entry: &DirEntry) -> bool {
        if !entry.path_is_symlink() {
            return true;
        }
        match dunce::canonicalize(entry.path()) {
            Ok(target) if target.starts_with(&self.root) => true,
            _ => {
                warn!(path = %entry.path().display(), reason = "outside root", "pruning walk");
                false
            }
        }
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()).unwrap_or(false)
}

/// Canonicalizes `path`, tolerating a missing tail. Existing components are
/// resolved one at a time so a symlink reached after `..` is still followed
/// before the containment check.
fn resolve(path: &Path, relative: &str) -> AppResult<PathBuf> {
    if let Ok(c) = dunce::canonicalize(path) {
        return Ok(c);
    }
    let mut cur = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => cur.push(comp.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                cur.pop();
            }
            Component::Normal(name) => {
                let next = cur.join(name);
                cur = match fs::symlink_metadata(&next) {
                    Ok(meta) => dunce::canonicalize(&next).map_err(|e| {
                        if meta.file_type().is_symlink() {
                            AppError::SymlinkNotAllowed(relative.to_string())
                        } else {
                            AppError::from_io(e, relative)
                        }
                    })?,
                    Err(_) => next,
                };
            }
        }
    }
    Ok(cur)
}

fn compile_glob(pattern: &str) -> AppResult<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| AppError::InvalidArgument(format!("bad glob pattern {pattern}: {e}")))
}

/// Walk depth needed to satisfy `pattern`; `None` when it contains `**`.
fn max_depth(pattern: &str) -> Option<usize> {
    if pattern.contains("**") {
        return None;
    }
    Some(pattern.split('/').filter(|s| !s.is_empty()).count().max(1))
}
