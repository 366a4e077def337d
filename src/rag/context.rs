// Context assembly: retrieved passages -> grounded context + citations

use crate::store::{Passage, ScoredPassage, FILE_NAME_KEY, PAGE_NO_KEY};

/// Separator between passages in the context block
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Placeholder for missing citation fields
pub const MISSING_FIELD: &str = "N/A";

/// Context and citations derived from one retrieval result, in the same order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    /// Passage contents joined by a blank line
    pub context: String,
    /// One `File: .., Page: ..` line per passage
    pub sources: Vec<String>,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources as the newline-joined block returned to callers
    pub fn sources_text(&self) -> String {
        self.sources.join("\n")
    }
}

/// Deterministic serializer for retrieval results
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build context and sources; an empty result yields empty outputs
    pub fn assemble(&self, result: &[ScoredPassage]) -> AssembledContext {
        let context = result
            .iter()
            .map(|scored| scored.passage.content.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let sources = result
            .iter()
            .map(|scored| Self::citation(&scored.passage))
            .collect();

        AssembledContext { context, sources }
    }

    /// Citation line for one passage
    pub fn citation(passage: &Passage) -> String {
        format!(
            "File: {}, Page: {}",
            passage.meta(FILE_NAME_KEY).unwrap_or(MISSING_FIELD),
            passage.meta(PAGE_NO_KEY).unwrap_or(MISSING_FIELD)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scored(content: &str, file: Option<&str>, page: Option<&str>) -> ScoredPassage {
        let mut metadata = BTreeMap::new();
        if let Some(file) = file {
            metadata.insert(FILE_NAME_KEY.to_string(), file.to_string());
        }
        if let Some(page) = page {
            metadata.insert(PAGE_NO_KEY.to_string(), page.to_string());
        }
        ScoredPassage {
            passage: Passage::new(content, content, metadata),
            score: 0.5,
        }
    }

    #[test]
    fn test_assemble_empty() {
        let assembled = ContextAssembler::new().assemble(&[]);
        assert_eq!(assembled.context, "");
        assert!(assembled.sources.is_empty());
        assert!(assembled.is_empty());
        assert_eq!(assembled.sources_text(), "");
    }

    #[test]
    fn test_assemble_preserves_order() {
        let result = vec![
            scored("first", Some("a.pdf"), Some("1")),
            scored("second", Some("b.pdf"), Some("7")),
            scored("third", Some("c.pdf"), Some("3")),
        ];

        let assembled = ContextAssembler::new().assemble(&result);
        assert_eq!(assembled.context, "first\n\nsecond\n\nthird");
        assert_eq!(
            assembled.sources,
            vec![
                "File: a.pdf, Page: 1",
                "File: b.pdf, Page: 7",
                "File: c.pdf, Page: 3",
            ]
        );
    }

    #[test]
    fn test_missing_fields_render_na() {
        let result = vec![
            scored("x", None, Some("2")),
            scored("y", Some("z.pdf"), None),
            scored("w", None, None),
        ];

        let assembled = ContextAssembler::new().assemble(&result);
        assert_eq!(
            assembled.sources_text(),
            "File: N/A, Page: 2\nFile: z.pdf, Page: N/A\nFile: N/A, Page: N/A"
        );
    }

    #[test]
    fn test_single_passage_has_no_separator() {
        let assembled = ContextAssembler::new().assemble(&[scored("only", None, None)]);
        assert_eq!(assembled.context, "only");
    }
}
