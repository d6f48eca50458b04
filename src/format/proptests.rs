//! Property-based tests for reply formatting

use super::*;
use proptest::prelude::*;

/// Text biased toward markup characters and blank-line boundaries
fn arb_reply() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-zA-Z ]{1,12}",
            Just(":".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("&".to_string()),
            Just("<script>".to_string()),
            Just("&amp;".to_string()),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

fn block_texts(markup: &Markup) -> Vec<String> {
    markup
        .blocks()
        .iter()
        .flat_map(|block| match block {
            Block::Section { label, body } => vec![label.clone(), body.clone()],
            Block::Paragraph(text) => vec![text.clone()],
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_no_raw_markup_characters(text in arb_reply()) {
        let markup = format(&text);
        for piece in block_texts(&markup) {
            prop_assert!(!piece.contains('<'));
            prop_assert!(!piece.contains('>'));
            // every & starts an entity we produced
            let stripped = piece
                .replace("&amp;", "")
                .replace("&lt;", "")
                .replace("&gt;", "");
            prop_assert!(!stripped.contains('&'));
        }
        prop_assert!(!markup.to_html().contains("<script"));
    }

    #[test]
    fn prop_block_count_matches_nonempty_chunks(text in arb_reply()) {
        let expected = text
            .split("\n\n")
            .filter(|chunk| !chunk.trim().is_empty())
            .count();
        prop_assert_eq!(format(&text).blocks().len(), expected);
    }

    #[test]
    fn prop_blocks_have_no_surrounding_whitespace(text in arb_reply()) {
        for piece in block_texts(&format(&text)) {
            prop_assert_eq!(piece.trim(), piece.as_str());
        }
    }
}
