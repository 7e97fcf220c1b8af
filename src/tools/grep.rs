use crate::{errors::AppResult, sandbox::SandboxedFileSystem, tools::is_binary};
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Matches(pub Vec<String>);

impl fmt::Display for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

/// Plain substring search over every text file matching `glob`.
/// Each hit is reported as `"<file>: <line>"`.
pub fn search(fs: &SandboxedFileSystem, pattern: &str, glob: &str) -> AppResult<Matches> {
    let mut results = Vec::new();
    for file in fs.list(glob)? {
        let raw = fs.read(&file)?;
        if is_binary(&raw) {
            warn!(path = %file, reason = "binary content", "skipping file");
            continue;
        }
        let Ok(content) = String::from_utf8(raw) else {
            warn!(path = %file, reason = "not valid UTF-8", "skipping file");
            continue;
        };
        results.extend(
            content
                .lines()
                .filter(|line| line.contains(pattern))
                .map(|line| format!("{file}: {line}")),
        );
    }
    Ok(Matches(results))
}
