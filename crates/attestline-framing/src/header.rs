//! Response head and trailer metadata.
//!
//! The demultiplexer is generic over its head and trailer types and never
//! looks inside them. These are the default shapes used by
//! [`ResponseParts`](crate::ResponseParts) and the replay tooling.

/// One metadata field, as received. Names keep their original casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Header fields of a response head or trailer block.
///
/// Kept in wire order with repeats intact, since attestation and usage
/// trailers may legitimately repeat a name. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    /// Every value for `name`, in wire order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.is_named(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Header> {
        self.entries
    }

    /// Name-value pairs in wire order.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries.into_iter().map(|h| (h.name, h.value)).collect()
    }
}

impl FromIterator<Header> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        let entries = iter.into_iter().collect();
        Self { entries }
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter().map(|(n, v)| Header::new(n, v)).collect()
    }
}

/// Status and headers sent at the start of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: u16, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Header-like metadata delivered with the terminal chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailers {
    pub headers: HeaderMap,
}

impl Trailers {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

impl From<HeaderMap> for Trailers {
    fn from(headers: HeaderMap) -> Self {
        Self { headers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_insert_and_get() {
        let mut map = HeaderMap::new();
        map.insert("Content-Type", "application/octet-stream");
        assert_eq!(map.get("content-type"), Some("application/octet-stream"));
        assert_eq!(map.get("X-Missing"), None);
    }

    #[test]
    fn header_map_keeps_duplicates_in_order() {
        let mut map = HeaderMap::new();
        map.insert("X-Attestation", "a");
        map.insert("x-attestation", "b");

        assert_eq!(map.get("X-Attestation"), Some("a"));
        assert_eq!(map.get_all("X-ATTESTATION"), vec!["a", "b"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn header_map_from_pairs() {
        let map: HeaderMap = vec![
            ("grpc-status".to_string(), "0".to_string()),
            ("grpc-message".to_string(), "".to_string()),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = map.into_vec().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["grpc-status", "grpc-message"]);
    }

    #[test]
    fn into_pairs_keeps_wire_order() {
        let mut map = HeaderMap::new();
        map.insert("x-status", "ok");
        map.insert("X-Usage-Tokens", "12");
        assert_eq!(
            map.into_pairs(),
            vec![
                ("x-status".to_string(), "ok".to_string()),
                ("X-Usage-Tokens".to_string(), "12".to_string()),
            ]
        );
    }

    #[test]
    fn response_head_success_range() {
        assert!(ResponseHead::new(200, HeaderMap::new()).is_success());
        assert!(ResponseHead::new(299, HeaderMap::new()).is_success());
        assert!(!ResponseHead::new(199, HeaderMap::new()).is_success());
        assert!(!ResponseHead::new(503, HeaderMap::new()).is_success());
    }

    #[test]
    fn trailers_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Usage-Tokens", "42");
        let trailers = Trailers::from(headers);
        assert_eq!(trailers.get("x-usage-tokens"), Some("42"));
        assert!(Trailers::default().headers.is_empty());
    }
}
