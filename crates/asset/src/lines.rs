//! Line reading shared by the OBJ and MTL parsers.

use std::io::{self, BufRead};

/// Numbered lines decoded lossily, so stray Latin-1 bytes in comments or names
/// do not abort a load. Only genuine read failures surface as errors.
pub(crate) struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> LossyLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    /// Zero-based line number and the line text, line ending included.
    type Item = io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line_no = self.line_no;
                self.line_no += 1;
                Some(Ok((line_no, String::from_utf8_lossy(&self.buf).into_owned())))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Record content with any `#` comment and surrounding whitespace removed.
pub(crate) fn content(line: &str) -> &str {
    match line.find('#') {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let src: &[u8] = b"# caf\xe9\r\nv 1 2 3";
        let lines: Vec<_> = LossyLines::new(src).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, 0);
        assert_eq!(lines[0].1, "# caf\u{fffd}\r\n");
        assert_eq!(lines[1], (1, "v 1 2 3".to_owned()));
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(content("f 1 2 3 # tri\n"), "f 1 2 3");
        assert_eq!(content("   # only a comment"), "");
        assert_eq!(content("  Kd 1 0 0 \r\n"), "Kd 1 0 0");
    }
}
