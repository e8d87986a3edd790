//! Property-based invariant tests for the stores and trace parsing.
//!
//! 1. Decoding arbitrary bytes never panics
//! 2. Any prefix of a valid encoding either decodes to the full list or fails
//! 3. History never exceeds capacity and never holds a URL twice
//! 4. The last visited URL is always first
//! 5. Parsing arbitrary text as a trace never panics, and parsed timestamps
//!    never go back

use std::collections::HashSet;

use panview::UrlEntry;
use panview::store::{HistoryStore, decode_entries, encode_entries};
use panview::trace::parse_trace;
use proptest::prelude::*;

fn entry_strategy() -> impl Strategy<Value = UrlEntry> {
    ("[a-z]{1,6}", "\\PC{0,12}")
        .prop_map(|(host, title)| UrlEntry::new(format!("https://{host}.example/"), title))
}

proptest! {
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_entries(&bytes);
    }

    #[test]
    fn prefixes_decode_fully_or_fail(
        entries in proptest::collection::vec(entry_strategy(), 0..6),
        cut in 0usize..512,
    ) {
        let bytes = encode_entries(&entries);
        let cut = cut.min(bytes.len());
        match decode_entries(&bytes[..cut]) {
            Ok(decoded) => {
                prop_assert_eq!(cut, bytes.len());
                prop_assert_eq!(decoded, entries);
            }
            Err(_) => prop_assert!(cut < bytes.len()),
        }
    }

    #[test]
    fn history_is_bounded_and_deduplicated(
        capacity in 1usize..8,
        visits in proptest::collection::vec(entry_strategy(), 1..40),
    ) {
        let mut history = HistoryStore::new(capacity);
        for visit in &visits {
            history.visit(visit.url.clone(), visit.title.clone());
            prop_assert!(history.len() <= capacity);
            prop_assert_eq!(&history.entries()[0].url, &visit.url);
            prop_assert_eq!(&history.entries()[0].title, &visit.title);
        }
        let unique: HashSet<_> = history.entries().iter().map(|e| &e.url).collect();
        prop_assert_eq!(unique.len(), history.len());
    }

    #[test]
    fn trace_parsing_never_panics(text in "\\PC{0,200}") {
        if let Ok(records) = parse_trace(&text) {
            prop_assert!(records.windows(2).all(|w| w[0].t_ms <= w[1].t_ms));
        }
    }
}
