use crate::error::{Result, XgressError};
use serde::Deserialize;

/// Lazily splits a multi-document YAML text into generic trees.
///
/// Yields `(position, document)` pairs. The first syntax error is yielded as
/// [`XgressError::MalformedStream`] and ends the stream. Text with no content
/// at all (blank lines and comments only) has no documents; an explicit `---`
/// still counts as one empty document.
pub struct DocumentStream<'a> {
    inner: serde_yaml::Deserializer<'a>,
    position: usize,
    done: bool,
}

impl<'a> DocumentStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: serde_yaml::Deserializer::from_str(text),
            position: 0,
            done: is_blank(text),
        }
    }
}

impl Iterator for DocumentStream<'_> {
    type Item = Result<(usize, serde_yaml::Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let document = self.inner.next()?;
        let position = self.position;
        self.position += 1;

        match serde_yaml::Value::deserialize(document) {
            Ok(value) => Some(Ok((position, value))),
            Err(source) => {
                self.done = true;
                Some(Err(XgressError::MalformedStream {
                    document: position,
                    source,
                }))
            }
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Whether a document carries no content (`---` with nothing after it, `{}`).
pub fn is_empty_document(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_documents_in_order() {
        let text = "a: 1\n---\nb: 2\n---\nc: 3\n";
        let docs: Vec<_> = DocumentStream::new(text).map(|d| d.unwrap()).collect();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].0, 0);
        assert_eq!(docs[2].0, 2);
        assert_eq!(docs[1].1["b"], serde_yaml::Value::from(2));
    }

    #[test]
    fn empty_text_has_no_documents() {
        assert_eq!(DocumentStream::new("").count(), 0);
        assert_eq!(DocumentStream::new("\n  \n# only a comment\n").count(), 0);
    }

    #[test]
    fn explicit_separator_is_one_empty_document() {
        let docs: Vec<_> = DocumentStream::new("---\n").map(|d| d.unwrap()).collect();
        assert_eq!(docs.len(), 1);
        assert!(is_empty_document(&docs[0].1));
    }

    #[test]
    fn empty_documents_are_detected() {
        let docs: Vec<_> = DocumentStream::new("---\n---\n{}\n")
            .map(|d| d.unwrap().1)
            .collect();
        assert!(!docs.is_empty());
        assert!(docs.iter().all(is_empty_document));
        assert!(!is_empty_document(&serde_yaml::Value::from("x")));
    }

    #[test]
    fn syntax_error_ends_the_stream() {
        let text = "a: 1\n---\nb: [unclosed\n---\nc: 3\n";
        let items: Vec<_> = DocumentStream::new(text).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(XgressError::MalformedStream { document, .. }) => assert_eq!(*document, 1),
            other => panic!("expected malformed stream, got {other:?}"),
        }
    }
}
