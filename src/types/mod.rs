use std::{borrow, fmt, hash, ops};

use derive_more::From;
use ntex_bytes::ByteString;

mod decimal;
mod table;
mod tag;
mod value;

pub use self::decimal::Decimal;
pub use self::table::{encode_table, FieldTable, MAX_NESTING};
pub use self::tag::{NativeType, TypeTag, TYPE_TAGS};
pub use self::value::{datetime_to_timestamp, timestamp_to_datetime, AmqpValue};

/// Text carried with a one byte length prefix.
///
/// Length is checked on encode, values longer than 255 bytes cannot be sent.
#[derive(Clone, Eq, Ord, PartialOrd, PartialEq)]
pub struct ShortStr(ByteString);

impl ShortStr {
    pub const fn from_static(s: &'static str) -> ShortStr {
        ShortStr(ByteString::from_static(s))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes().as_ref()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ShortStr {
    fn default() -> ShortStr {
        ShortStr::from_static("")
    }
}

impl From<&'static str> for ShortStr {
    fn from(s: &'static str) -> ShortStr {
        ShortStr(ByteString::from_static(s))
    }
}

impl From<ByteString> for ShortStr {
    fn from(s: ByteString) -> ShortStr {
        ShortStr(s)
    }
}

impl From<String> for ShortStr {
    fn from(s: String) -> ShortStr {
        ShortStr(ByteString::from(s))
    }
}

impl<'a> From<&'a ByteString> for ShortStr {
    fn from(s: &'a ByteString) -> ShortStr {
        ShortStr(s.clone())
    }
}

impl hash::Hash for ShortStr {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl borrow::Borrow<str> for ShortStr {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ShortStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ShortStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for ShortStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ShortStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered sequence of tagged values, items may carry different tags.
#[derive(Debug, Default, PartialEq, Eq, Clone, Hash, From)]
pub struct FieldArray(pub Vec<AmqpValue>);

impl FieldArray {
    pub fn new() -> FieldArray {
        FieldArray(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> ::std::slice::Iter<'_, AmqpValue> {
        self.0.iter()
    }

    pub fn push<V: Into<AmqpValue>>(&mut self, value: V) -> &mut Self {
        self.0.push(value.into());
        self
    }
}

impl ops::Deref for FieldArray {
    type Target = Vec<AmqpValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<AmqpValue> for FieldArray {
    fn from_iter<I: IntoIterator<Item = AmqpValue>>(iter: I) -> Self {
        FieldArray(iter.into_iter().collect())
    }
}
