//! Commands built on [`crate::sandbox::SandboxedFileSystem`].

pub mod checksum;
pub mod grep;
pub mod json_pretty;
pub mod list;
pub mod read;
pub mod replace;

/// Binary heuristic: text is bell, backspace, tab, newline, form feed,
/// carriage return, escape, and anything from 0x20 up.
pub fn is_binary(data: &[u8]) -> bool {
    data.iter().any(|&b| !is_text_byte(b))
}

fn is_text_byte(b: u8) -> bool {
    matches!(b, 7 | 8 | 9 | 10 | 12 | 13 | 27) || b >= 0x20
}

#[cfg(test)]
mod tests {
    use super::is_binary;

    #[test]
    fn text_and_binary_bytes() {
        assert!(!is_binary(b"plain text\r\n\twith \x1b[0m escapes\x0c"));
        assert!(!is_binary("caf\u{e9}".as_bytes()));
        assert!(!is_binary(b""));
        assert!(is_binary(b"\x00\x01\x02TODO"));
        assert!(is_binary(b"vertical\x0btab"));
    }
}
