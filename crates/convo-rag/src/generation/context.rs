//! Numbered grounding block and its parallel citation list

use crate::providers::SearchResult;
use crate::types::Citation;

/// Grounding text handed to the model together with the citations it numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundingContext {
    /// `[i] <title>:\n<content>\n` blocks separated by a blank line
    pub text: String,
    /// `citations[i - 1]` describes block `[i]`
    pub citations: Vec<Citation>,
}

impl GroundingContext {
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Builds grounding context from ranked search results
pub struct ContextBuilder;

impl ContextBuilder {
    /// Number results in the order the index returned them.
    ///
    /// An empty slice yields empty text and no citations; generation still runs
    /// on whatever the model can do without grounding.
    pub fn build(results: &[SearchResult]) -> GroundingContext {
        let mut blocks = Vec::with_capacity(results.len());
        let mut citations = Vec::with_capacity(results.len());

        for (i, result) in results.iter().enumerate() {
            let index = i + 1;
            let title = Self::display_title(result, index);

            blocks.push(format!("[{}] {}:\n{}\n", index, title, result.content));
            citations.push(Citation {
                index,
                source_id: result.id.clone(),
                title,
                relevance_score: result.score,
            });
        }

        GroundingContext {
            text: blocks.join("\n"),
            citations,
        }
    }

    /// Title to show for a result; blank titles count as missing
    fn display_title(result: &SearchResult, index: usize) -> String {
        match result.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => format!("Document {}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_numbers_blocks_and_citations() {
        let results = vec![
            SearchResult::new("doc1", "Refunds within 30 days.", 0.91).with_title("Policy A"),
            SearchResult::new("doc2", "International orders excluded.", 0.77).with_title("Policy B"),
        ];

        let context = ContextBuilder::build(&results);

        assert_eq!(
            context.text,
            "[1] Policy A:\nRefunds within 30 days.\n\n[2] Policy B:\nInternational orders excluded.\n"
        );
        assert_eq!(
            context.citations,
            vec![
                Citation {
                    index: 1,
                    source_id: "doc1".to_string(),
                    title: "Policy A".to_string(),
                    relevance_score: 0.91,
                },
                Citation {
                    index: 2,
                    source_id: "doc2".to_string(),
                    title: "Policy B".to_string(),
                    relevance_score: 0.77,
                },
            ]
        );
    }

    #[test]
    fn test_missing_title_defaults_to_position() {
        let results = vec![
            SearchResult::new("a", "first", 0.5).with_title("Known"),
            SearchResult::new("b", "second", 0.4),
            SearchResult::new("c", "third", 0.3).with_title("   "),
        ];

        let context = ContextBuilder::build(&results);
        assert!(context.text.contains("[2] Document 2:\nsecond\n"));
        assert!(context.text.contains("[3] Document 3:\nthird\n"));
        assert_eq!(context.citations[1].title, "Document 2");
    }

    #[test]
    fn test_present_title_is_passed_through_verbatim() {
        let results = vec![SearchResult::new("a", "c", 0.5).with_title("  Policy A ")];

        let context = ContextBuilder::build(&results);
        assert_eq!(context.text, "[1]   Policy A :\nc\n");
        assert_eq!(context.citations[0].title, "  Policy A ");
    }

    #[test]
    fn test_empty_results() {
        let context = ContextBuilder::build(&[]);
        assert_eq!(context.text, "");
        assert!(context.citations.is_empty());
        assert!(context.is_empty());
    }

    #[test]
    fn test_order_is_not_changed_by_score() {
        // Index order wins even when scores disagree
        let results = vec![
            SearchResult::new("low", "x", 0.1),
            SearchResult::new("high", "y", 0.9),
        ];
        let context = ContextBuilder::build(&results);
        assert_eq!(context.citations[0].source_id, "low");
        assert_eq!(context.citations[1].source_id, "high");
    }

    proptest! {
        #[test]
        fn prop_citations_mirror_results(
            items in prop::collection::vec(("[a-z0-9]{1,8}", any::<Option<String>>(), 0.0f32..1.0), 0..12)
        ) {
            let results: Vec<SearchResult> = items
                .iter()
                .map(|(id, title, score)| SearchResult {
                    id: id.clone(),
                    title: title.clone(),
                    content: "body".to_string(),
                    score: *score,
                })
                .collect();

            let context = ContextBuilder::build(&results);

            prop_assert_eq!(context.citations.len(), results.len());
            for (i, citation) in context.citations.iter().enumerate() {
                prop_assert_eq!(citation.index, i + 1);
                prop_assert_eq!(&citation.source_id, &results[i].id);
                prop_assert_eq!(citation.relevance_score, results[i].score);
                let marker = format!("[{}] ", i + 1);
                prop_assert!(context.text.contains(&marker));
            }
        }
    }
}
