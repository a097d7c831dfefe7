//! Property-based tests for the causality token and content containers.

use proptest::prelude::*;
use qrc_core::{Content, Encoding, IndexValue, VClock};

const ENCODINGS: [Encoding; 2] = [Encoding::Base64, Encoding::Binary];

fn encoding_strategy() -> impl Strategy<Value = Encoding> {
    prop::sample::select(ENCODINGS.to_vec())
}

/// Produces wire input that is valid for the chosen encoding.
fn wire_strategy() -> impl Strategy<Value = (Vec<u8>, Encoding)> {
    (prop::collection::vec(any::<u8>(), 0..64), encoding_strategy()).prop_map(
        |(raw, encoding)| match encoding {
            Encoding::Binary => (raw, encoding),
            Encoding::Base64 => (
                VClock::decode_with(&raw, Encoding::Binary)
                    .unwrap()
                    .encode_with(Encoding::Base64),
                encoding,
            ),
        },
    )
}

// ============================================================================
// VClock
// ============================================================================

proptest! {
    #[test]
    fn vclock_round_trips_across_encodings(
        (wire, e1) in wire_strategy(),
        e2 in encoding_strategy()
    ) {
        let original = VClock::decode(&wire, e1.as_str()).unwrap();
        let re_encoded = original.encode(e2.as_str()).unwrap();
        let back = VClock::decode(&re_encoded, e2.as_str()).unwrap();
        prop_assert_eq!(back, original);
    }

    #[test]
    fn vclock_equality_matches_bytes(
        a in prop::collection::vec(any::<u8>(), 0..32),
        b in prop::collection::vec(any::<u8>(), 0..32)
    ) {
        let va = VClock::decode(&a, "binary").unwrap();
        let vb = VClock::decode(&b, "binary").unwrap();
        prop_assert_eq!(va == vb, a == b);
    }

    #[test]
    fn vclock_rejects_unknown_encodings(name in "[a-z0-9]{1,8}") {
        prop_assume!(name != "base64" && name != "binary");
        prop_assert!(VClock::decode(b"abc", &name).is_err());
    }
}

// ============================================================================
// Content
// ============================================================================

proptest! {
    #[test]
    fn index_set_replaces_values(
        initial in prop::collection::vec(0i64..100, 0..10),
        replacement in prop::collection::btree_set(0i64..100, 0..10)
    ) {
        let mut content = Content::new();
        for v in &initial {
            content.add_index("score_int", *v);
        }
        content.add_index("name_bin", "kept");
        content.set_index("score_int", replacement.iter().copied());

        let values: Vec<IndexValue> = content
            .index_values("score_int")
            .into_iter()
            .cloned()
            .collect();
        let expected: Vec<IndexValue> = replacement.into_iter().map(IndexValue::Int).collect();
        prop_assert_eq!(values, expected);
        prop_assert_eq!(content.index_values("name_bin").len(), 1);
    }

    #[test]
    fn text_payload_agrees_both_ways(text in ".{0,40}") {
        let mut content = Content::new();
        content.set_content_type("text/plain");
        content.set_data(text.clone());
        let bytes = content.encoded_data().unwrap().unwrap().to_vec();
        prop_assert_eq!(bytes.clone(), text.clone().into_bytes());

        let mut other = Content::new();
        other.set_content_type("text/plain");
        other.set_encoded_data(bytes);
        prop_assert_eq!(other.data().unwrap().cloned(), Some(qrc_core::Value::String(text)));
    }
}
