//! Property-based test generators using proptest.

use proptest::prelude::*;
use roomcast_protocol::RoomDocument;

/// Strategy for generating valid usernames.
pub fn owner_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,15}").expect("valid regex")
}

/// Strategy for generating valid room names.
pub fn room_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_]{1,24}").expect("valid regex")
}

/// Strategy for generating opaque room payloads.
pub fn payload_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<i64>().prop_map(|n| serde_json::json!(n)),
        "[a-z ]{0,32}".prop_map(|s| serde_json::json!(s)),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(|v| serde_json::json!(v)),
    ]
}

/// Strategy for generating well-formed room documents.
pub fn document_strategy() -> impl Strategy<Value = RoomDocument> {
    (room_name_strategy(), payload_strategy())
        .prop_map(|(name, payload)| RoomDocument::new(name, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_documents_round_trip(doc in document_strategy()) {
            let text = doc.to_json().unwrap();
            let parsed = RoomDocument::from_json(&text).unwrap();
            prop_assert_eq!(parsed, doc);
        }

        #[test]
        fn generated_names_are_publishable(
            owner in owner_strategy(),
            doc in document_strategy(),
        ) {
            let store = roomcast_store::RoomStore::in_memory();
            store.publish(&owner, &doc).unwrap();
            prop_assert!(store.contains(&owner, &doc.room).unwrap());
        }
    }
}
