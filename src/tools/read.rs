use crate::{errors::{AppError, AppResult}, sandbox::SandboxedFileSystem};

/// Reads `file` as UTF-8 text.
pub fn read_file(fs: &SandboxedFileSystem, file: &str) -> AppResult<String> {
    let data = fs.read(file)?;
    String::from_utf8(data).map_err(|_| AppError::BinaryFile(file.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn reads_text() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("notes.txt").write_str("hello\nworld\n").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        assert_eq!(read_file(&fs, "notes.txt").unwrap(), "hello\nworld\n");
    }

    #[test]
    fn invalid_utf8_is_binary() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("blob.bin").write_binary(&[0xff, 0xfe, 0x00, 0x41]).unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        let err = read_file(&fs, "blob.bin").unwrap_err();
        assert_eq!(err.code(), "BinaryFile");
        assert!(err.to_string().contains("Use checksum command instead"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        assert_eq!(read_file(&fs, "nope.txt").unwrap_err().code(), "NotFound");
    }
}
