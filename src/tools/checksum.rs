use crate::{errors::{AppError, AppResult}, sandbox::SandboxedFileSystem};
use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Algorithm {
    Md5,
    #[default]
    Sha256,
    Sha512,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
        }
    }

    pub fn hex_digest(self, data: &[u8]) -> String {
        match self {
            Algorithm::Md5 => hex::encode(Md5::digest(data)),
            Algorithm::Sha256 => hex::encode(Sha256::digest(data)),
            Algorithm::Sha512 => hex::encode(Sha512::digest(data)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Algorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            _ => Err(AppError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Checksum {
    pub algorithm: &'static str,
    pub digest: String,
    pub path: String,
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.digest, self.path)
    }
}

pub fn checksum(fs: &SandboxedFileSystem, file: &str, algorithm: Algorithm) -> AppResult<Checksum> {
    let data = fs.read(file)?;
    Ok(Checksum { algorithm: algorithm.name(), digest: algorithm.hex_digest(&data), path: file.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn sha256_of_abc() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("f.bin").write_binary(b"abc").unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        let out = checksum(&fs, "f.bin", Algorithm::Sha256).unwrap();
        assert_eq!(
            out.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad f.bin"
        );
    }

    #[test]
    fn md5_and_sha512_of_abc() {
        assert_eq!(Algorithm::Md5.hex_digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            Algorithm::Sha512.hex_digest(b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn unknown_algorithm_rejected_before_read() {
        let err = "crc32".parse::<Algorithm>().unwrap_err();
        assert_eq!(err.code(), "UnsupportedAlgorithm");
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
    }

    #[test]
    fn checksum_of_missing_file() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let fs = SandboxedFileSystem::new(tmp.path()).unwrap();
        assert_eq!(checksum(&fs, "gone", Algorithm::Md5).unwrap_err().code(), "NotFound");
    }
}
