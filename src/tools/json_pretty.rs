use crate::{errors::{AppError, AppResult}, sandbox::SandboxedFileSystem};

/// Re-serializes a JSON file with 2-space indentation, keeping key order.
pub fn json_pretty(fs: &SandboxedFileSystem, file: &str) -> AppResult<String> {
    let content = fs.read(file)?;
    let value: serde_json::Value = serde_json::from_slice(&content).map_err(|e| {
        // serde_json appends its own position; keep just the reason
        let full = e.to_string();
        let message = full.rsplit_once(" at line ").map_or(full.as_str(), |(m, _)| m).to_string();
        AppError::InvalidJson { message, line: e.line(), column: e.column() }
    })?;
    serde_json::to_string_pretty(&value).map_err(|e| AppError::Io(e.to_string()))
}
