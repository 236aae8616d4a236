//! JSON encode/decode helpers at the crate boundary.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::AppError;

/// Encode any serializable value as compact JSON.
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(data)?)
}

/// Encode as indented JSON, used for console reports.
pub fn to_json_pretty<T: Serialize + ?Sized>(data: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Decode JSON text. Only well-formedness and shape are checked.
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, AppError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn malformed_text_is_serialization_error() {
        let result: Result<BTreeMap<String, u32>, _> = from_json("{not json");
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[test]
    fn decodes_plain_structures() {
        let map: BTreeMap<String, u32> = from_json(r#"{"available":2,"rented":1}"#).unwrap();
        assert_eq!(map["available"], 2);
        assert_eq!(to_json(&map).unwrap(), r#"{"available":2,"rented":1}"#);
    }
}
