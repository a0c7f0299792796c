//! Span ids
//!
//! Nodes and properties get separate counters, numbered in the order their
//! declarations close. A document parsed from a path prefixes every id with a
//! CRC32 of that path, so ids from two files never collide and re-parsing the
//! same file yields the same ids. Documents parsed from a bare string carry the
//! unprefixed form.

use crc32fast::Hasher;

/// CRC32 of the document path, `/`-separated regardless of platform
pub fn document_id(path: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(path.replace('\\', "/").as_bytes());
    format!("{:08x}", hasher.finalize())
}

#[derive(Debug, Clone, Default)]
pub struct SpanIds {
    document: Option<String>,
    nodes: u32,
    properties: u32,
}

impl SpanIds {
    /// Ids for a document with no path: `n1`, `p1`, ...
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Ids for the document at `path`: `<document id>:n1`, ...
    pub fn for_path(path: &str) -> Self {
        Self {
            document: Some(document_id(path)),
            ..Self::default()
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn node(&mut self) -> String {
        self.nodes += 1;
        self.format('n', self.nodes)
    }

    pub fn property(&mut self) -> String {
        self.properties += 1;
        self.format('p', self.properties)
    }

    fn format(&self, tag: char, count: u32) -> String {
        match &self.document {
            Some(document) => format!("{}:{}{}", document, tag, count),
            None => format!("{}{}", tag, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_path_stable() {
        assert_eq!(document_id("/forms/edit.trellis"), document_id("/forms/edit.trellis"));
        assert_eq!(document_id("forms\\edit.trellis"), document_id("forms/edit.trellis"));
        assert_ne!(document_id("/forms/edit.trellis"), document_id("/forms/list.trellis"));
        assert_eq!(document_id("/forms/edit.trellis").len(), 8);
    }

    #[test]
    fn test_counters_per_kind() {
        let mut ids = SpanIds::anonymous();
        assert_eq!(ids.property(), "p1");
        assert_eq!(ids.node(), "n1");
        assert_eq!(ids.property(), "p2");
        assert_eq!(ids.document(), None);

        let mut ids = SpanIds::for_path("/a.trellis");
        let prefix = document_id("/a.trellis");
        assert_eq!(ids.document(), Some(prefix.as_str()));
        assert_eq!(ids.node(), format!("{}:n1", prefix));
    }
}
