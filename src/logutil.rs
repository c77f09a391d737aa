//! Helpers for putting raw save blobs into single-line log records.

use std::fmt::Write;

/// Longest blob prefix shown in a log line.
const BLOB_PREVIEW: usize = 96;

/// Render a stored blob for logging.
///
/// Control characters and backslashes are escaped (`\n`, `\t`, `\x07`, ...)
/// so a corrupt blob cannot split a log record. Blobs longer than the
/// preview are cut and suffixed with their total byte length.
pub fn escape_blob(blob: &str) -> String {
    let mut out = String::with_capacity(blob.len().min(BLOB_PREVIEW) + 16);
    let mut chars = blob.chars();
    for ch in chars.by_ref().take(BLOB_PREVIEW) {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        let _ = write!(out, "… ({} bytes)", blob.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_blob;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_blob("H01;\nC0\t1;\u{7}"), "H01;\\nC0\\t1;\\x07");
    }

    #[test]
    fn short_blobs_pass_through() {
        assert_eq!(escape_blob("S007;T00420;"), "S007;T00420;");
    }

    #[test]
    fn long_blobs_are_cut_with_length() {
        let blob = "H00;".repeat(40);
        let escaped = escape_blob(&blob);
        assert!(escaped.ends_with("… (160 bytes)"));
        assert!(escaped.starts_with("H00;H00;"));
    }
}
