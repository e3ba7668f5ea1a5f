//! Multi-valued dictionary for submitted form data.

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// Submitted form data, keeping every value of repeated keys.
///
/// Checkbox groups submit one `key=value` pair per ticked box, so a key
/// may carry several values in submission order.
///
/// # Examples
///
/// ```
/// use taxi_http::QueryDict;
///
/// let qd = QueryDict::parse("model=Prius&drivers=1&drivers=4");
/// assert_eq!(qd.get("model"), Some("Prius"));
/// assert_eq!(qd.get("drivers"), Some("4"));
/// assert_eq!(qd.get_list("drivers"), Some(&["1".to_string(), "4".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: HashMap<String, Vec<String>>,
}

impl QueryDict {
    /// Creates an empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded string such as `"a=1&b=2"`.
    ///
    /// `+` decodes to a space and percent escapes are decoded as UTF-8
    /// (invalid sequences are replaced). A pair without `=` yields an
    /// empty value.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();
        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            qd.append(decode(key), decode(value));
        }
        qd
    }

    /// Builds a `QueryDict` from already decoded pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut qd = Self::new();
        for (k, v) in pairs {
            qd.append(k, v);
        }
        qd
    }

    /// Appends a value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces all values of `key` with a single one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), vec![value.into()]);
    }

    /// Returns the last value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns every value submitted for `key`.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// Returns `true` if `key` was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Encodes back to an urlencoded string with pairs sorted.
    pub fn urlencode(&self) -> String {
        let mut parts: Vec<String> = self
            .data
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", encode(key), encode(value)))
            })
            .collect();
        parts.sort();
        parts.join("&")
    }
}

fn decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn encode(input: &str) -> String {
    utf8_percent_encode(input, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(QueryDict::parse("").is_empty());
        assert!(QueryDict::parse("&&").is_empty());
    }

    #[test]
    fn test_parse_simple() {
        let qd = QueryDict::parse("username=alice&license_number=ABC12345");
        assert_eq!(qd.len(), 2);
        assert_eq!(qd.get("username"), Some("alice"));
        assert_eq!(qd.get("license_number"), Some("ABC12345"));
    }

    #[test]
    fn test_parse_repeated_keys_keep_order() {
        let qd = QueryDict::parse("drivers=3&drivers=1&drivers=2");
        assert_eq!(qd.get("drivers"), Some("2"));
        assert_eq!(
            qd.get_list("drivers").unwrap(),
            &["3".to_string(), "1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn test_parse_no_value() {
        let qd = QueryDict::parse("flag");
        assert_eq!(qd.get("flag"), Some(""));
    }

    #[test]
    fn test_parse_decoding() {
        let qd = QueryDict::parse("model=Model+S&country=C%C3%B4te%20d%27Ivoire");
        assert_eq!(qd.get("model"), Some("Model S"));
        assert_eq!(qd.get("country"), Some("Côte d'Ivoire"));
    }

    #[test]
    fn test_parse_keeps_surrounding_spaces() {
        let qd = QueryDict::parse("license_number=+ABC12345+");
        assert_eq!(qd.get("license_number"), Some(" ABC12345 "));
    }

    #[test]
    fn test_missing_key() {
        let qd = QueryDict::parse("a=1");
        assert_eq!(qd.get("b"), None);
        assert!(qd.get_list("b").is_none());
        assert!(!qd.contains_key("b"));
    }

    #[test]
    fn test_set_replaces() {
        let mut qd = QueryDict::parse("a=1&a=2");
        qd.set("a", "3");
        assert_eq!(qd.get_list("a").unwrap(), &["3".to_string()]);
    }

    #[test]
    fn test_from_pairs() {
        let qd = QueryDict::from_pairs([("drivers", "1"), ("drivers", "2"), ("model", "Leaf")]);
        assert_eq!(qd.get_list("drivers").map(<[String]>::len), Some(2));
        assert_eq!(qd.get("model"), Some("Leaf"));
    }

    #[test]
    fn test_urlencode_sorted_and_escaped() {
        let qd = QueryDict::from_pairs([("b", "x y"), ("a", "1")]);
        assert_eq!(qd.urlencode(), "a=1&b=x%20y");
    }
}
