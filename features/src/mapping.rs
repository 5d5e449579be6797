use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};

/// A fixed table from the accepted labels of a categorical column to their integer codes.
///
/// Lookups are exact and case-sensitive. Codes are unique so the table can be inverted.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "BTreeMap<String, i64>")]
pub struct CategoryMapping {
    entries: Vec<(String, i64)>,
}

impl CategoryMapping {
    /// Creates a new `CategoryMapping`.
    ///
    /// # Arguments
    /// * `entries` - Pairs of accepted label and the code it maps to.
    ///
    /// # Returns
    /// The mapping, or a description of the problem if it is empty or has repeated
    /// labels or codes.
    pub fn new<I, S>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let entries: Vec<(String, i64)> = entries
            .into_iter()
            .map(|(label, code)| (label.into(), code))
            .collect();

        if entries.is_empty() {
            return Err("a category mapping must accept at least one label".into());
        }

        for (i, (label, code)) in entries.iter().enumerate() {
            for (other_label, other_code) in &entries[..i] {
                if label == other_label {
                    return Err(format!("label '{label}' is mapped more than once"));
                }
                if code == other_code {
                    return Err(format!(
                        "labels '{other_label}' and '{label}' share the code {code}"
                    ));
                }
            }
        }

        Ok(Self { entries })
    }

    /// The `yes → 1`, `no → 0` mapping shared by every boolean column.
    pub fn yes_no() -> Self {
        Self::from_static(&[("yes", 1), ("no", 0)])
    }

    /// Builds a mapping from a table known to be valid at compile time.
    pub(crate) fn from_static(entries: &[(&str, i64)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&(label, code)| (label.to_string(), code))
                .collect(),
        }
    }

    /// Returns the code for `label`, if it is accepted.
    pub fn code(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, code)| code)
    }

    /// Returns the label that maps to `code`, if any.
    pub fn label(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|&&(_, c)| c == code)
            .map(|(label, _)| label.as_str())
    }

    /// Iterates over the accepted labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Declaration order does not matter.
impl PartialEq for CategoryMapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(label, code)| other.code(label) == Some(*code))
    }
}

impl Eq for CategoryMapping {}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = CategoryMapping;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an object mapping labels to integer codes")
    }

    // Entries are collected in document order so repeated labels reach the validation.
    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, i64>()? {
            entries.push(entry);
        }
        CategoryMapping::new(entries).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for CategoryMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MappingVisitor)
    }
}

impl From<CategoryMapping> for BTreeMap<String, i64> {
    fn from(value: CategoryMapping) -> Self {
        value.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        let mapping = CategoryMapping::yes_no();

        assert_eq!(mapping.code("yes"), Some(1));
        assert_eq!(mapping.code("no"), Some(0));
        assert_eq!(mapping.code("Yes"), None);
        assert_eq!(mapping.code(" yes"), None);
        assert_eq!(mapping.code("maybe"), None);
    }

    #[test]
    fn test_inverse_lookup() {
        let mapping =
            CategoryMapping::new([("furnished", 0), ("semi-furnished", 1), ("unfurnished", 2)])
                .unwrap();

        for label in mapping.labels() {
            let code = mapping.code(label).unwrap();
            assert_eq!(mapping.label(code), Some(label));
        }
        assert_eq!(mapping.label(3), None);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(CategoryMapping::new(Vec::<(String, i64)>::new()).is_err());
        assert!(CategoryMapping::new([("a", 0), ("a", 1)]).is_err());
        assert!(CategoryMapping::new([("a", 0), ("b", 0)]).is_err());
    }

    #[test]
    fn test_deserializes_from_object() {
        let mapping: CategoryMapping = serde_json::from_str(r#"{"no": 0, "yes": 1}"#).unwrap();
        assert_eq!(mapping.code("yes"), Some(1));
        assert_eq!(mapping.len(), 2);

        let err = serde_json::from_str::<CategoryMapping>("{}");
        assert!(err.is_err());

        let err = serde_json::from_str::<CategoryMapping>(r#"{"a": 1, "b": 1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_deserialize_rejects_repeated_labels() {
        let err = serde_json::from_str::<CategoryMapping>(r#"{"yes": 1, "yes": 0}"#).unwrap_err();
        assert!(err.to_string().contains("'yes' is mapped more than once"));

        let json = r#"{"name": "dup", "columns": [
            {"name": "mainroad", "kind": "categorical", "mapping": {"yes": 1, "no": 0, "yes": 2}}
        ]}"#;
        assert!(crate::Schema::from_json(json).is_err());
    }
}
