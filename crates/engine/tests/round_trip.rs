//! Property tests for the encrypt/decrypt round trip.

use portadata_engine::{decrypt_tree, encrypt_tree, open, seal, Key, KEY_LEN};
use proptest::prelude::*;
use serde_json::{json, Value};

fn test_key() -> Key {
    Key::from_bytes([0x5au8; KEY_LEN])
}

/// Scalars whose textual encoding is unambiguous: plain lowercase strings
/// (excluding the JSON keywords), integers, booleans, and null. Strings that
/// are themselves valid JSON literals change type across a round trip by
/// design and are excluded here.
fn unambiguous_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z ]{0,12}"
            .prop_filter("JSON keywords are ambiguous", |s| {
                s != "true" && s != "false" && s != "null"
            })
            .prop_map(Value::String),
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        Just(Value::Null),
    ]
}

fn value_tree() -> impl Strategy<Value = Value> {
    unambiguous_scalar().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6).prop_map(|m| {
                Value::Object(m.into_iter().collect())
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encrypt_then_decrypt_is_identity(tree in value_tree()) {
        let key = test_key();
        let encrypted = encrypt_tree(&key, &tree).unwrap();
        let decrypted = decrypt_tree(&key, &encrypted).unwrap();
        prop_assert_eq!(decrypted, tree);
    }

    #[test]
    fn sealing_twice_never_repeats_an_envelope(plaintext in prop::collection::vec(any::<u8>(), 0..64)) {
        let key = test_key();
        let a = seal(&key, &plaintext).unwrap();
        let b = seal(&key, &plaintext).unwrap();
        prop_assert_ne!(a.nonce, b.nonce);
        prop_assert_ne!(a.to_base64(), b.to_base64());
    }

    #[test]
    fn sealed_bytes_open_to_the_same_bytes(plaintext in prop::collection::vec(any::<u8>(), 0..256)) {
        let key = test_key();
        let envelope = seal(&key, &plaintext).unwrap();
        prop_assert_eq!(open(&key, &envelope.to_base64()).unwrap(), plaintext);
    }

    #[test]
    fn decrypt_with_wrong_key_preserves_the_tree(tree in value_tree()) {
        let key = test_key();
        let wrong = Key::from_bytes([0xa5u8; KEY_LEN]);
        let encrypted = encrypt_tree(&key, &tree).unwrap();
        // Every leaf fails to authenticate, so the tree comes back unchanged.
        prop_assert_eq!(decrypt_tree(&wrong, &encrypted).unwrap(), encrypted);
    }
}
