//! Editor-owned documents and the read-only snapshots handed to the TGT
//! language service.

use std::sync::Arc;

/// A single document as the editor sees it: a URI's text at a monotonic
/// version. Held for both SRC documents and their synthesised TGT mirrors.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub version: i64,
}

impl Document {
    pub fn new(text: impl Into<String>, version: i64) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }
}

/// An incremental edit description, as returned by `Snapshot::change_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRange {
    pub span_start: usize,
    pub span_length: usize,
    pub new_length: usize,
}

/// A snapshot handed to the TGT language service. Opaque except for the
/// three accessors below; identity matters because the service memoizes
/// derived state per-snapshot.
#[derive(Debug)]
pub struct Snapshot {
    text: Arc<str>,
}

impl Snapshot {
    pub fn new(text: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Self { text: text.into() })
    }

    pub fn get_text(&self, start: usize, end: usize) -> &str {
        &self.text[start..end]
    }

    pub fn get_length(&self) -> usize {
        self.text.len()
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Compute the change range from `old` to `self`: the span covering the
    /// longest-common-prefix/suffix-trimmed region of `old`, and the length
    /// of its replacement in `self`.
    pub fn change_range(&self, old: &Snapshot) -> Option<ChangeRange> {
        if Arc::ptr_eq(&self.text, &old.text) {
            return None;
        }

        let old_bytes = old.text.as_bytes();
        let new_bytes = self.text.as_bytes();

        let prefix_len = old_bytes
            .iter()
            .zip(new_bytes.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let old_remaining = old_bytes.len() - prefix_len;
        let new_remaining = new_bytes.len() - prefix_len;
        let suffix_len = old_bytes[prefix_len..]
            .iter()
            .rev()
            .zip(new_bytes[prefix_len..].iter().rev())
            .take(old_remaining.min(new_remaining))
            .take_while(|(a, b)| a == b)
            .count();

        Some(ChangeRange {
            span_start: prefix_len,
            span_length: old_bytes.len() - prefix_len - suffix_len,
            new_length: new_bytes.len() - prefix_len - suffix_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_range_identical_snapshots_is_none() {
        let snap = Snapshot::new("abc");
        assert!(snap.change_range(&snap).is_none());
    }

    #[test]
    fn change_range_detects_middle_edit() {
        let old = Snapshot::new("hello world");
        let new = Snapshot::new("hello there world");
        let range = new.change_range(&old).unwrap();
        assert_eq!(range.span_start, 6);
        assert_eq!(range.span_length, 0);
        assert_eq!(range.new_length, 6);
    }

    #[test]
    fn change_range_full_replacement() {
        let old = Snapshot::new("abc");
        let new = Snapshot::new("xyz");
        let range = new.change_range(&old).unwrap();
        assert_eq!(range.span_start, 0);
        assert_eq!(range.span_length, 3);
        assert_eq!(range.new_length, 3);
    }
}
