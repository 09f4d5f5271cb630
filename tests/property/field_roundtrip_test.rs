//! Property-based tests for field encryption.
//!
//! Any string sealed under a key opens to itself under that key and fails
//! under any other key.

use proptest::prelude::*;
use secretmarks::services::crypto_service::{CryptoService, CryptoServiceTrait, SessionKey};
use secretmarks::types::errors::CryptoError;

fn arb_key() -> impl Strategy<Value = [u8; 32]> {
    proptest::array::uniform32(any::<u8>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn field_roundtrips_under_same_key(value in any::<String>(), key in arb_key()) {
        let crypto = CryptoService::new();
        let key = SessionKey::from_slice(&key).unwrap();

        let token = crypto.encrypt_field(&value, &key).unwrap();
        prop_assert_eq!(crypto.decrypt_field(&token, &key).unwrap(), value);
    }

    #[test]
    fn field_fails_under_other_key(
        value in ".{0,64}",
        a in arb_key(),
        b in arb_key(),
    ) {
        prop_assume!(a != b);
        let crypto = CryptoService::new();
        let ka = SessionKey::from_slice(&a).unwrap();
        let kb = SessionKey::from_slice(&b).unwrap();

        let token = crypto.encrypt_field(&value, &ka).unwrap();
        let result = crypto.decrypt_field(&token, &kb);
        prop_assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }
}
