//! Normalized request payload storage.
//!
//! A [`RawValueMap`] maps each parameter name to one or more raw string values,
//! preserving the order in which names and values first appeared. Most
//! parameters carry a single value, so values are stored inline.

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Number of values stored inline per parameter.
const INLINE_VALUES: usize = 1;

type Values = SmallVec<[String; INLINE_VALUES]>;

/// Normalized view of a request payload: name to one-or-more raw values.
///
/// # Example
///
/// ```rust
/// use reqbind::RawValueMap;
///
/// let mut map = RawValueMap::new();
/// map.push("tag", "a");
/// map.push("tag", "b");
/// map.push("page", "2");
///
/// assert_eq!(map.get("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(map.first("page"), Some("2"));
/// assert_eq!(map.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawValueMap {
    inner: IndexMap<String, Values>,
}

impl RawValueMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with room for `capacity` names.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: IndexMap::with_capacity(capacity),
        }
    }

    /// Appends a value for `name`, keeping earlier values.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Appends several values for `name`.
    ///
    /// The name is recorded even when `values` is empty.
    pub fn extend_values<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.inner
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Returns every value recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.inner.get(name).map(SmallVec::as_slice)
    }

    /// Returns the first value recorded for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(<[String]>::first).map(String::as_str)
    }

    /// Returns true if `name` was recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no names were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over names and their values, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Appends every value of `other`, name by name.
    pub fn merge(&mut self, other: RawValueMap) {
        for (name, values) in other.inner {
            self.inner.entry(name).or_default().extend(values);
        }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for RawValueMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.push(name, value);
        }
        map
    }
}

/// Returns the values that count as present for binding purposes.
///
/// A lookup is absent when it returned nothing, an empty list, or a single
/// empty string.
pub(crate) fn present(values: Option<&[String]>) -> Option<&[String]> {
    match values {
        None | Some([]) => None,
        Some([only]) if only.is_empty() => None,
        Some(values) => Some(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut map = RawValueMap::new();
        map.push("b", "1");
        map.push("a", "2");
        map.push("b", "3");

        let names: Vec<_> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(map.get("b").unwrap(), ["1", "3"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_first() {
        let map: RawValueMap = vec![("q", "rust"), ("q", "lang")].into_iter().collect();
        assert_eq!(map.first("q"), Some("rust"));
        assert_eq!(map.first("other"), None);
    }

    #[test]
    fn test_extend_values_records_empty_list() {
        let mut map = RawValueMap::new();
        map.extend_values("ids", Vec::<String>::new());

        assert!(map.contains("ids"));
        assert_eq!(map.get("ids").unwrap().len(), 0);
    }

    #[test]
    fn test_merge_appends() {
        let mut left: RawValueMap = vec![("a", "1")].into_iter().collect();
        let right: RawValueMap = vec![("a", "2"), ("b", "3")].into_iter().collect();
        left.merge(right);

        assert_eq!(left.get("a").unwrap(), ["1", "2"]);
        assert_eq!(left.first("b"), Some("3"));
    }

    #[test]
    fn test_present() {
        let empty: Vec<String> = Vec::new();
        let blank = vec![String::new()];
        let blank_pair = vec![String::new(), String::new()];
        let value = vec!["x".to_string()];

        assert!(present(None).is_none());
        assert!(present(Some(empty.as_slice())).is_none());
        assert!(present(Some(blank.as_slice())).is_none());
        assert!(present(Some(blank_pair.as_slice())).is_some());
        assert_eq!(present(Some(value.as_slice())), Some(value.as_slice()));
    }
}
