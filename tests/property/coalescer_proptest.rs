//! Property-based tests for local edit coalescing

use collabnotes::shared::{ClientMessage, EditCoalescer};
use proptest::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_millis(120);

proptest! {
    #[test]
    fn test_burst_inside_window_sends_latest_once(offsets in proptest::collection::vec(0u64..119, 1..20)) {
        let mut offsets = offsets;
        offsets.sort_unstable();
        let start = Instant::now();
        let mut coalescer = EditCoalescer::new(WINDOW);

        for (i, offset) in offsets.iter().enumerate() {
            let at = start + Duration::from_millis(*offset);
            let title = format!("v{}", i);
            prop_assert!(coalescer.record("doc", title, json!(i), at).is_none());
            prop_assert!(coalescer.poll(at).is_none());
        }

        let last = offsets.len() - 1;
        match coalescer.poll(start + WINDOW) {
            Some(ClientMessage::Edit { document_id, title, body }) => {
                prop_assert_eq!(document_id, "doc");
                prop_assert_eq!(title, format!("v{}", last));
                prop_assert_eq!(body, json!(last));
            }
            other => prop_assert!(false, "expected one edit, got {:?}", other),
        }
        prop_assert!(!coalescer.has_pending());
        prop_assert!(coalescer.poll(start + WINDOW * 2).is_none());
    }
}
