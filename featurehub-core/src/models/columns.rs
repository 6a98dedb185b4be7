//! JSON-as-text columns.
//!
//! `problem_type_details`, `files`, and `table_names` are TEXT columns holding
//! canonical JSON. Writes go through [`encode`], reads through [`decode`], which
//! also checks the stored shape against the Rust type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AdminError, Result};

pub const PROBLEM_TYPE_DETAILS: &str = "problem_type_details";
pub const FILES: &str = "files";
pub const TABLE_NAMES: &str = "table_names";

/// Free-form detail map, e.g. `{"classification_type": "multiclass"}`.
///
/// Keys serialize in sorted order, so equal maps always encode to equal text.
pub type Details = Map<String, Value>;

pub fn encode<T: Serialize + ?Sized>(column: &'static str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AdminError::column(column, e))
}

pub fn decode<T: DeserializeOwned>(column: &'static str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| AdminError::column(column, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn lists_keep_order_and_values() {
        let files = vec!["a.csv".to_string(), "b.csv".to_string()];
        let raw = encode(FILES, &files).unwrap();
        assert_eq!(raw, r#"["a.csv","b.csv"]"#);

        let back: Vec<String> = decode(FILES, &raw).unwrap();
        assert_eq!(back, files);
    }

    #[test]
    fn details_encode_canonically() {
        let mut a = Details::new();
        a.insert("zeta".into(), json!(1));
        a.insert("alpha".into(), json!("multiclass"));

        let mut b = Details::new();
        b.insert("alpha".into(), json!("multiclass"));
        b.insert("zeta".into(), json!(1));

        assert_eq!(
            encode(PROBLEM_TYPE_DETAILS, &a).unwrap(),
            encode(PROBLEM_TYPE_DETAILS, &b).unwrap()
        );
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let err = decode::<Vec<String>>(TABLE_NAMES, r#"{"entities": 1}"#).unwrap_err();
        assert!(matches!(err, AdminError::Column { column: "table_names", .. }));

        assert!(decode::<Vec<String>>(FILES, r#"["a.csv", 3]"#).is_err());
        assert!(decode::<Details>(PROBLEM_TYPE_DETAILS, "[]").is_err());
        assert!(decode::<Vec<String>>(FILES, "not json").is_err());
    }

    proptest! {
        #[test]
        fn prop_list_decode_reproduces_input(names in prop::collection::vec(".*", 0..20)) {
            let raw = encode(TABLE_NAMES, &names).unwrap();
            let back: Vec<String> = decode(TABLE_NAMES, &raw).unwrap();
            prop_assert_eq!(back, names);
        }
    }
}
