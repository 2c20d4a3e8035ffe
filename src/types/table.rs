use ntex_bytes::{BufMut, Bytes, BytesMut};

use super::{AmqpValue, FieldArray, ShortStr};
use crate::codec::{decode_bounded, read_u32, Decode, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};

/// Deepest allowed chain of tables and arrays nested inside each other.
pub const MAX_NESTING: usize = 64;

fn check_nesting(depth: usize) -> Result<(), AmqpParseError> {
    if depth >= MAX_NESTING {
        Err(AmqpParseError::NestingTooDeep(MAX_NESTING))
    } else {
        Ok(())
    }
}

/// Field table, an ordered list of key/value entries.
///
/// Entries are kept in insertion order and duplicate keys are preserved
/// both when building a table and when decoding one.
#[derive(Debug, Default, PartialEq, Eq, Clone, Hash)]
pub struct FieldTable(pub Vec<(ShortStr, AmqpValue)>);

impl FieldTable {
    pub fn new() -> FieldTable {
        FieldTable(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> ::std::slice::Iter<'_, (ShortStr, AmqpValue)> {
        self.0.iter()
    }

    /// Append entry, an existing entry with the same key is kept.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<ShortStr>,
        V: Into<AmqpValue>,
    {
        self.0.push((key.into(), value.into()));
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&AmqpValue> {
        self.0
            .iter()
            .find_map(|item| if item.0 == key { Some(&item.1) } else { None })
    }

    /// All values stored under `key`, in wire order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a AmqpValue> + 'a {
        self.0
            .iter()
            .filter(move |item| item.0 == key)
            .map(|item| &item.1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn content_size(&self) -> usize {
        self.0
            .iter()
            .fold(0, |r, (k, v)| r + k.encoded_size() + v.encoded_size())
    }

    /// Decodes a table enclosed by `depth` other containers.
    pub(crate) fn decode_nested(input: &mut Bytes, depth: usize) -> Result<Self, AmqpParseError> {
        check_nesting(depth)?;
        let size = read_u32(input)? as usize;
        decode_bounded(input, size, |content| {
            let mut entries = Vec::new();
            while !content.is_empty() {
                let key = ShortStr::decode(content)?;
                let value = AmqpValue::decode_nested(content, depth + 1)?;
                entries.push((key, value));
            }
            Ok(FieldTable(entries))
        })
    }
}

impl<K: Into<ShortStr>, V: Into<AmqpValue>> FromIterator<(K, V)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldTable(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Vec<(ShortStr, AmqpValue)>> for FieldTable {
    fn from(data: Vec<(ShortStr, AmqpValue)>) -> FieldTable {
        FieldTable(data)
    }
}

impl IntoIterator for FieldTable {
    type Item = (ShortStr, AmqpValue);
    type IntoIter = std::vec::IntoIter<(ShortStr, AmqpValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn put_content_size(size: usize, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
    let prefix = u32::try_from(size).map_err(|_| AmqpEncodeError::LengthOverflow(size))?;
    buf.put_u32(prefix);
    Ok(())
}

impl Encode for FieldTable {
    fn encoded_size(&self) -> usize {
        4 + self.content_size()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        put_content_size(self.content_size(), buf)?;
        for (k, v) in self.iter() {
            k.encode(buf)?;
            v.encode(buf)?;
        }
        Ok(())
    }
}

impl Decode for FieldTable {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        FieldTable::decode_nested(input, 0)
    }
}

/// Encodes a table argument, an absent table is sent as an empty one.
pub fn encode_table(table: Option<&FieldTable>, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
    match table {
        Some(table) => table.encode(buf),
        None => put_content_size(0, buf),
    }
}

impl FieldArray {
    fn content_size(&self) -> usize {
        self.0.iter().fold(0, |r, v| r + v.encoded_size())
    }

    pub(crate) fn decode_nested(input: &mut Bytes, depth: usize) -> Result<Self, AmqpParseError> {
        check_nesting(depth)?;
        let size = read_u32(input)? as usize;
        decode_bounded(input, size, |content| {
            let mut items = Vec::new();
            while !content.is_empty() {
                items.push(AmqpValue::decode_nested(content, depth + 1)?);
            }
            Ok(FieldArray(items))
        })
    }
}

impl Encode for FieldArray {
    fn encoded_size(&self) -> usize {
        4 + self.content_size()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        put_content_size(self.content_size(), buf)?;
        for v in self.iter() {
            v.encode(buf)?;
        }
        Ok(())
    }
}

impl Decode for FieldArray {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        FieldArray::decode_nested(input, 0)
    }
}
