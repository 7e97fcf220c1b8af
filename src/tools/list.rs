use crate::{errors::AppResult, sandbox::SandboxedFileSystem};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Listing(pub Vec<String>);

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

pub fn list(fs: &SandboxedFileSystem, glob: &str) -> AppResult<Listing> {
    fs.list(glob).map(Listing)
}
