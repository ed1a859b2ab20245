use serde::{Deserialize, Deserializer};

/// Deserializer for update fields that must distinguish "absent" from
/// "explicitly null". Plain `Option<Option<T>>` folds `null` into the outer
/// `None`; wrapping the inner deserialization in `Some` keeps the two apart:
/// a missing field stays `None` (via `#[serde(default)]`), `null` becomes
/// `Some(None)`, and a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn missing_field_is_absent() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert!(patch.description.is_none());
    }

    #[test]
    fn null_field_is_present_null() {
        let patch: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn value_field_is_present_value() {
        let patch: Patch = serde_json::from_str(r#"{"description": "hi"}"#).unwrap();
        assert_eq!(patch.description, Some(Some("hi".to_string())));
    }
}
