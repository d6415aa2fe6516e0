//! Ordered query strings.
//!
//! [`QueryString`] keeps name/value pairs in insertion order and allows
//! duplicate names, matching how query strings appear on the wire.
//! [`split_resource`] separates a URI into its base (no query, no fragment)
//! and its parsed query.

use std::fmt;

use url::Url;
use url::form_urlencoded;

use crate::error::{CoreError, Result};

/// An ordered, duplicate-preserving list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Create an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a form-urlencoded query, with or without a leading `?`.
    ///
    /// ```
    /// use framework_core::QueryString;
    ///
    /// let query = QueryString::parse("?a=1&b=two%20words&a=3");
    /// assert_eq!(query.get("b"), Some("two words"));
    /// assert_eq!(query.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
    /// ```
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Append a parameter, keeping existing ones with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Append every parameter of `other`, after the existing ones.
    pub fn extend(&mut self, other: QueryString) {
        self.pairs.extend(other.pairs);
    }

    /// First value for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a name, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every parameter with this name. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != name);
        before - self.pairs.len()
    }

    /// Number of parameters, counting duplicates.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return `base` with this query applied. An empty query leaves no `?`.
    pub fn apply_to(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if self.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.to_string()));
        }
        url
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        f.write_str(&encoded)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryString {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Split an absolute URI into its base and its query parameters.
///
/// The returned base keeps scheme, authority and path but has no query and
/// no fragment.
///
/// ```
/// use framework_core::query::split_resource;
///
/// let (base, query) = split_resource("http://h/p?a=1&b=2").unwrap();
/// assert_eq!(base.as_str(), "http://h/p");
/// assert_eq!(query.to_string(), "a=1&b=2");
/// ```
pub fn split_resource(uri: &str) -> Result<(Url, QueryString)> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_url(uri, "empty URI"));
    }
    let mut url = Url::parse(trimmed).map_err(|e| CoreError::invalid_url(uri, e))?;
    let query = url.query().map(QueryString::parse).unwrap_or_default();
    url.set_query(None);
    url.set_fragment(None);
    Ok((url, query))
}
