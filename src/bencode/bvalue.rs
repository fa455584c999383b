use std::collections::BTreeMap;

/// A decoded bencode value.
///
/// Dictionary keys are raw bytes kept in a `BTreeMap`, so iteration always
/// follows byte-lexicographic order and re-encoding reproduces the canonical
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes for any string
	Integer(i64),
	List(Vec<BValue>),
	Dict(BTreeMap<Vec<u8>, BValue>),
}

impl BValue {
    pub fn string(s: &str) -> Self {
        BValue::ByteString(s.as_bytes().to_vec())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            BValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BValue::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the byte string as `&str` when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[BValue]> {
        match self {
            BValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BValue>> {
        match self {
            BValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&BValue> {
        self.as_dict()?.get(key)
    }

    /// Short type name used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BValue::ByteString(_) => "byte string",
            BValue::Integer(_) => "integer",
            BValue::List(_) => "list",
            BValue::Dict(_) => "dictionary",
        }
    }
}

impl From<i64> for BValue {
    fn from(i: i64) -> Self {
        BValue::Integer(i)
    }
}

impl From<&str> for BValue {
    fn from(s: &str) -> Self {
        BValue::string(s)
    }
}

impl From<Vec<u8>> for BValue {
    fn from(b: Vec<u8>) -> Self {
        BValue::ByteString(b)
    }
}

impl From<Vec<BValue>> for BValue {
    fn from(l: Vec<BValue>) -> Self {
        BValue::List(l)
    }
}

impl From<BTreeMap<Vec<u8>, BValue>> for BValue {
    fn from(d: BTreeMap<Vec<u8>, BValue>) -> Self {
        BValue::Dict(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let value = BValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert!(value.as_bytes().is_none());

        let value = BValue::string("spam");
        assert_eq!(value.as_str(), Some("spam"));
        assert_eq!(value.as_bytes(), Some(b"spam".as_slice()));
        assert!(value.as_integer().is_none());

        let value = BValue::ByteString(vec![0xff, 0xfe]);
        assert!(value.as_str().is_none());
        assert_eq!(value.as_bytes().map(|b| b.len()), Some(2));

        let value = BValue::List(vec![]);
        assert!(value.as_list().is_some());
        assert!(value.as_dict().is_none());
    }

    #[test]
    fn test_dict_get() {
        let mut map = BTreeMap::new();
        map.insert(b"cow".to_vec(), BValue::string("moo"));
        let value = BValue::from(map);

        assert_eq!(value.get(b"cow").and_then(BValue::as_str), Some("moo"));
        assert!(value.get(b"spam").is_none());
        assert!(BValue::Integer(1).get(b"cow").is_none());
    }
}
