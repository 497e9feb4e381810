//! Annotation matching

use std::collections::BTreeMap;

/// Service class annotation consulted by the admission gate.
pub const SERVICE_CLASS_ANNOTATION: &str = "kubernetes.io/service.class";

/// Service class value selecting KubeLB.
pub const SERVICE_CLASS_KUBELB: &str = "kubelb";

/// True iff `key` is present in `annotations` with a non-empty value equal to `value`.
///
/// A present-but-empty value never matches, even when `value` is empty too,
/// so an unset annotation can never be mistaken for a match.
pub fn matches(annotations: &BTreeMap<String, String>, key: &str, value: &str) -> bool {
    annotations
        .get(key)
        .is_some_and(|actual| !actual.is_empty() && actual == value)
}

/// An annotation key/value pair objects must carry to be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingAnnotation {
    pub name: String,
    pub value: String,
}

impl MatchingAnnotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The `kubernetes.io/service.class: kubelb` selector.
    pub fn service_class() -> Self {
        Self::new(SERVICE_CLASS_ANNOTATION, SERVICE_CLASS_KUBELB)
    }

    /// Matches optional object annotations; no annotations never match.
    pub fn matches(&self, annotations: Option<&BTreeMap<String, String>>) -> bool {
        annotations.is_some_and(|a| matches(a, &self.name, &self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_absent_key_never_matches() {
        assert!(!matches(&annotations(&[]), "k", "v"));
        assert!(!matches(&annotations(&[]), "k", ""));
    }

    #[test]
    fn test_empty_value_never_matches() {
        let a = annotations(&[("k", "")]);
        assert!(!matches(&a, "k", "v"));
        assert!(!matches(&a, "k", ""));
    }

    #[test]
    fn test_equal_value_matches() {
        assert!(matches(&annotations(&[("k", "x")]), "k", "x"));
    }

    #[test]
    fn test_different_value_does_not_match() {
        assert!(!matches(&annotations(&[("k", "x")]), "k", "y"));
    }

    #[test]
    fn test_service_class_selector() {
        let selector = MatchingAnnotation::service_class();
        let a = annotations(&[("kubernetes.io/service.class", "kubelb")]);

        assert!(selector.matches(Some(&a)));
        assert!(!selector.matches(None));
    }
}
