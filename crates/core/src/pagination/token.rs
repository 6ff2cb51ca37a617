use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{attr, Record};
use crate::serde::format_timestamp;

/// Errors raised while decoding a continuation token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("nextToken is not valid base64")]
    InvalidBase64,
    #[error("nextToken does not contain a valid key: {0}")]
    InvalidKey(String),
    #[error("nextToken is missing {0}")]
    MissingAttribute(&'static str),
}

/// A store "last evaluated key": attribute name to string value.
///
/// Keys of the published index are all strings, so the map is flat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(BTreeMap<String, String>);

impl PageKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index key of `record` on the published index, including the table keys.
    pub fn for_record(record: &Record) -> Self {
        let mut key = Self::new();
        key.insert(attr::CONSTANT_KEY, record.constant_key.clone());
        key.insert(
            attr::PUBLISHED_DATE_TIME,
            format_timestamp(&record.published_date_time),
        );
        key.insert(attr::PERSON_ID, record.person_id.clone());
        key.insert(attr::ENTRY_ID, record.entry_id.clone());
        key
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PageKey {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Encodes a page key as base64 of its JSON object form.
pub fn encode_token(key: &PageKey) -> String {
    let object: serde_json::Map<String, serde_json::Value> = key
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    STANDARD.encode(serde_json::Value::Object(object).to_string())
}

/// Decodes a token produced by [`encode_token`].
///
/// The key must carry the index keys and the table keys, since a start key
/// on a secondary index is only usable with both.
pub fn decode_token(token: &str) -> Result<PageKey, TokenError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|_| TokenError::InvalidBase64)?;
    let json = String::from_utf8(bytes).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
    let key: PageKey =
        serde_json::from_str(&json).map_err(|e| TokenError::InvalidKey(e.to_string()))?;

    for required in [
        attr::CONSTANT_KEY,
        attr::PUBLISHED_DATE_TIME,
        attr::PERSON_ID,
        attr::ENTRY_ID,
    ] {
        if key.get(required).is_none() {
            return Err(TokenError::MissingAttribute(required));
        }
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DmlOperation, CONSTANT_KEY_VALUE};
    use chrono::{TimeZone, Utc};

    fn index_key() -> PageKey {
        [
            ("ConstantKey", "Constant"),
            ("PublishedDateTime", "2024-05-01T10:00:00.000Z"),
            ("PersonId", "108"),
            ("EntryId", "urn:uuid:3113101A18414AF9E0635220010A8E86"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_token_is_base64_of_json_object() {
        let token = encode_token(&index_key());
        let json = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["ConstantKey"], "Constant");
        assert_eq!(value["PublishedDateTime"], "2024-05-01T10:00:00.000Z");
        assert_eq!(value["PersonId"], "108");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let key = index_key();
        assert_eq!(decode_token(&encode_token(&key)), Ok(key));
    }

    #[test]
    fn test_decode_rejects_token_without_table_keys() {
        let json = r#"{"ConstantKey":"Constant","PublishedDateTime":"2024-05-01T10:00:00.000Z"}"#;
        assert_eq!(
            decode_token(&STANDARD.encode(json)),
            Err(TokenError::MissingAttribute("PersonId"))
        );

        let json = r#"{"ConstantKey":"Constant","PublishedDateTime":"2024-05-01T10:00:00.000Z","PersonId":"108"}"#;
        assert_eq!(
            decode_token(&STANDARD.encode(json)),
            Err(TokenError::MissingAttribute("EntryId"))
        );
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert_eq!(decode_token("%%%not-base64%%%"), Err(TokenError::InvalidBase64));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let token = STANDARD.encode("not json");
        assert!(matches!(decode_token(&token), Err(TokenError::InvalidKey(_))));
    }

    #[test]
    fn test_decode_rejects_non_string_values() {
        let token = STANDARD.encode(r#"{"ConstantKey":"Constant","PublishedDateTime":42}"#);
        assert!(matches!(decode_token(&token), Err(TokenError::InvalidKey(_))));
    }

    #[test]
    fn test_decode_requires_index_attributes() {
        let token = STANDARD.encode(r#"{"ConstantKey":"Constant"}"#);
        assert_eq!(
            decode_token(&token),
            Err(TokenError::MissingAttribute("PublishedDateTime"))
        );
    }

    #[test]
    fn test_for_record_uses_index_and_table_keys() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record = Record {
            person_id: "108".to_string(),
            entry_id: "urn:uuid:3113101A18414AF9E0635220010A8E86".to_string(),
            feed: "empassignment".to_string(),
            dml_operation: DmlOperation::Update,
            is_processed: true,
            worker_type: "EMP".to_string(),
            processed_message: "done".to_string(),
            constant_key: CONSTANT_KEY_VALUE.to_string(),
            published_date_time: ts,
            updated_date_time: ts,
        };

        assert_eq!(PageKey::for_record(&record), index_key());
    }
}
