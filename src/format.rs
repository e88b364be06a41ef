//! Small text helpers for reports: previews and byte sizes.

/// A preview of extracted text, cut at a character (not byte) boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// At most `limit` characters of the original text.
    pub text: String,
    /// Whether anything was cut off.
    pub truncated: bool,
    /// Character count of the full text.
    pub total_chars: usize,
}

/// Keep the first `limit` characters of `text`.
///
/// Korean documents are mostly multi-byte, so slicing by byte index would
/// panic or split a syllable; this walks `char_indices` instead.
pub fn preview(text: &str, limit: usize) -> Preview {
    let total_chars = text.chars().count();
    if total_chars <= limit {
        return Preview {
            text: text.to_string(),
            truncated: false,
            total_chars,
        };
    }
    let cut = text
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    Preview {
        text: text[..cut].to_string(),
        truncated: true,
        total_chars,
    }
}

/// Group an integer with thousands separators: `1234567` → `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a byte count as `12,345 bytes (12.06 KB)`.
pub fn byte_size(n: u64) -> String {
    format!("{} bytes ({:.2} KB)", thousands(n), n as f64 / 1024.0)
}
