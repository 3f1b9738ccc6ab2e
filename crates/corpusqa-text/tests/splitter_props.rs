use corpusqa_text::TextSplitter;
use proptest::prelude::*;

fn corpus_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z]{1,12}",
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just(". ".to_string()),
            Just("ünïcödé".to_string()),
        ],
        1..80,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn chunks_are_bounded_and_cover_the_text(
        text in corpus_text(),
        size in 2usize..60,
        overlap_frac in 0.0f64..0.9,
    ) {
        let overlap = ((size as f64) * overlap_frac) as usize;
        let splitter = TextSplitter::new(size, overlap).unwrap();
        let spans = splitter.split_spans(&text);

        let mut covered = vec![false; text.len()];
        let mut last_start = None;
        for span in &spans {
            prop_assert!(span.text.chars().count() <= size);
            prop_assert!(!span.text.trim().is_empty());
            prop_assert_eq!(&text[span.start..span.end()], span.text.as_str());
            if let Some(prev) = last_start {
                prop_assert!(span.start >= prev, "chunks must not move backwards");
            }
            last_start = Some(span.start);
            for flag in &mut covered[span.start..span.end()] {
                *flag = true;
            }
        }
        for (i, c) in text.char_indices() {
            if !c.is_whitespace() {
                prop_assert!(covered[i], "character at byte {} not covered", i);
            }
        }
    }

    #[test]
    fn splitting_is_deterministic(text in corpus_text()) {
        let splitter = TextSplitter::new(40, 10).unwrap();
        prop_assert_eq!(splitter.split(&text), splitter.split(&text));
    }
}

#[test]
fn whitespace_only_input_is_empty_not_error() {
    let splitter = TextSplitter::new(500, 100).unwrap();
    assert!(splitter.split("\n\n   \n").is_empty());
}
