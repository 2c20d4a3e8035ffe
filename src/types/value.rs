use chrono::{DateTime, TimeZone, Utc};
use ntex_bytes::{BufMut, ByteString, Bytes, BytesMut};
use ordered_float::OrderedFloat;

use super::{Decimal, FieldArray, FieldTable, ShortStr, TypeTag};
use crate::codec::{read_u8, Decode, DecodeTagged, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};

/// Represents an AMQP field value for use in tables and arrays
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub enum AmqpValue {
    /// Explicit absence of a value, distinct from a missing table key.
    Void,

    /// Represents a true or false value.
    Bool(bool),

    /// Integer in the range -2^7 to 2^7 - 1 inclusive.
    Byte(i8),

    /// Integer in the range 0 to 2^8 - 1 inclusive.
    Ubyte(u8),

    /// Integer in the range -2^15 to 2^15 - 1 inclusive.
    Short(i16),

    /// Integer in the range 0 to 2^16 - 1 inclusive.
    Ushort(u16),

    /// Integer in the range -2^31 to 2^31 - 1 inclusive.
    Int(i32),

    /// Integer in the range 0 to 2^32 - 1 inclusive.
    Uint(u32),

    /// Integer in the range -2^63 to 2^63 - 1 inclusive.
    Long(i64),

    /// Integer in the range 0 to 2^64 - 1 inclusive.
    Ulong(u64),

    /// 32-bit floating point number (IEEE 754 binary32).
    Float(OrderedFloat<f32>),

    /// 64-bit floating point number (IEEE 754 binary64).
    Double(OrderedFloat<f64>),

    /// Scaled decimal number.
    Decimal(Decimal),

    /// Text of at most 255 bytes.
    ShortString(ShortStr),

    /// Text with a 32-bit length prefix.
    LongString(ByteString),

    /// Nested sequence of values.
    Array(FieldArray),

    /// Seconds since the unix epoch.
    Timestamp(u64),

    /// Nested table.
    Table(FieldTable),
}

impl AmqpValue {
    /// Tag written in front of this value inside tables and arrays.
    pub fn tag(&self) -> TypeTag {
        match self {
            AmqpValue::Void => TypeTag::Void,
            AmqpValue::Bool(_) => TypeTag::Bool,
            AmqpValue::Byte(_) => TypeTag::Byte,
            AmqpValue::Ubyte(_) => TypeTag::Ubyte,
            AmqpValue::Short(_) => TypeTag::Short,
            AmqpValue::Ushort(_) => TypeTag::Ushort,
            AmqpValue::Int(_) => TypeTag::Int,
            AmqpValue::Uint(_) => TypeTag::Uint,
            AmqpValue::Long(_) => TypeTag::Long,
            AmqpValue::Ulong(_) => TypeTag::Ulong,
            AmqpValue::Float(_) => TypeTag::Float,
            AmqpValue::Double(_) => TypeTag::Double,
            AmqpValue::Decimal(_) => TypeTag::Decimal,
            AmqpValue::ShortString(_) => TypeTag::ShortString,
            AmqpValue::LongString(_) => TypeTag::LongString,
            AmqpValue::Array(_) => TypeTag::Array,
            AmqpValue::Timestamp(_) => TypeTag::Timestamp,
            AmqpValue::Table(_) => TypeTag::Table,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, AmqpValue::Void)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AmqpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmqpValue::ShortString(s) => Some(s.as_str()),
            AmqpValue::LongString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Expresses integer-typed values as i64 value when possible. Notably, does not include ulong.
    /// Returns `None` for variants other than supported integers.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            AmqpValue::Byte(v) => Some(*v as i64),
            AmqpValue::Ubyte(v) => Some(*v as i64),
            AmqpValue::Short(v) => Some(*v as i64),
            AmqpValue::Ushort(v) => Some(*v as i64),
            AmqpValue::Int(v) => Some(*v as i64),
            AmqpValue::Uint(v) => Some(*v as i64),
            AmqpValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Expresses unsigned integer-typed values as u64 value.
    pub fn as_ulong(&self) -> Option<u64> {
        match self {
            AmqpValue::Ubyte(v) => Some(*v as u64),
            AmqpValue::Ushort(v) => Some(*v as u64),
            AmqpValue::Uint(v) => Some(*v as u64),
            AmqpValue::Ulong(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&FieldTable> {
        match self {
            AmqpValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&FieldArray> {
        match self {
            AmqpValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            AmqpValue::Timestamp(ts) => timestamp_to_datetime(*ts),
            _ => None,
        }
    }

    /// Size of the value without its tag.
    fn value_size(&self) -> usize {
        match self {
            AmqpValue::ShortString(s) => s.encoded_size(),
            AmqpValue::LongString(s) => s.encoded_size(),
            AmqpValue::Array(a) => a.encoded_size(),
            AmqpValue::Table(t) => t.encoded_size(),
            // every remaining tag is fixed width
            _ => self.tag().fixed_size().unwrap_or(0),
        }
    }

    fn encode_value(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        match self {
            AmqpValue::Void => Ok(()),
            AmqpValue::Bool(v) => v.encode(buf),
            AmqpValue::Byte(v) => v.encode(buf),
            AmqpValue::Ubyte(v) => v.encode(buf),
            AmqpValue::Short(v) => v.encode(buf),
            AmqpValue::Ushort(v) => v.encode(buf),
            AmqpValue::Int(v) => v.encode(buf),
            AmqpValue::Uint(v) => v.encode(buf),
            AmqpValue::Long(v) => v.encode(buf),
            AmqpValue::Ulong(v) => v.encode(buf),
            AmqpValue::Float(v) => v.0.encode(buf),
            AmqpValue::Double(v) => v.0.encode(buf),
            AmqpValue::Decimal(v) => v.encode(buf),
            AmqpValue::ShortString(v) => v.encode(buf),
            AmqpValue::LongString(v) => v.encode(buf),
            AmqpValue::Array(v) => v.encode(buf),
            AmqpValue::Timestamp(v) => v.encode(buf),
            AmqpValue::Table(v) => v.encode(buf),
        }
    }
}

impl Encode for AmqpValue {
    fn encoded_size(&self) -> usize {
        1 + self.value_size()
    }

    /// Encodes the tag byte followed by the value
    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        buf.put_u8(self.tag().as_byte());
        self.encode_value(buf)
    }
}

impl AmqpValue {
    /// Decodes a tagged value found inside `depth` enclosing containers.
    pub(crate) fn decode_nested(input: &mut Bytes, depth: usize) -> Result<Self, AmqpParseError> {
        let tag = TypeTag::from_byte(read_u8(input)?)?;
        AmqpValue::decode_nested_with_tag(input, tag, depth)
    }

    fn decode_nested_with_tag(
        input: &mut Bytes,
        tag: TypeTag,
        depth: usize,
    ) -> Result<Self, AmqpParseError> {
        match tag {
            TypeTag::Void => Ok(AmqpValue::Void),
            TypeTag::Bool => bool::decode(input).map(AmqpValue::Bool),
            TypeTag::Byte => i8::decode(input).map(AmqpValue::Byte),
            TypeTag::Ubyte => u8::decode(input).map(AmqpValue::Ubyte),
            TypeTag::Short => i16::decode(input).map(AmqpValue::Short),
            TypeTag::Ushort => u16::decode(input).map(AmqpValue::Ushort),
            TypeTag::Int => i32::decode(input).map(AmqpValue::Int),
            TypeTag::Uint => u32::decode(input).map(AmqpValue::Uint),
            TypeTag::Long => i64::decode(input).map(AmqpValue::Long),
            TypeTag::Ulong => u64::decode(input).map(AmqpValue::Ulong),
            TypeTag::Float => f32::decode(input).map(|o| AmqpValue::Float(OrderedFloat(o))),
            TypeTag::Double => f64::decode(input).map(|o| AmqpValue::Double(OrderedFloat(o))),
            TypeTag::Decimal => Decimal::decode(input).map(AmqpValue::Decimal),
            TypeTag::ShortString => ShortStr::decode(input).map(AmqpValue::ShortString),
            TypeTag::LongString => ByteString::decode(input).map(AmqpValue::LongString),
            TypeTag::Array => FieldArray::decode_nested(input, depth).map(AmqpValue::Array),
            TypeTag::Timestamp => u64::decode(input).map(AmqpValue::Timestamp),
            TypeTag::Table => FieldTable::decode_nested(input, depth).map(AmqpValue::Table),
        }
    }
}

impl DecodeTagged for AmqpValue {
    fn decode_with_tag(input: &mut Bytes, tag: TypeTag) -> Result<Self, AmqpParseError> {
        AmqpValue::decode_nested_with_tag(input, tag, 0)
    }
}

impl Decode for AmqpValue {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        AmqpValue::decode_nested(input, 0)
    }
}

impl From<bool> for AmqpValue {
    fn from(v: bool) -> Self {
        AmqpValue::Bool(v)
    }
}

impl From<u32> for AmqpValue {
    fn from(v: u32) -> Self {
        AmqpValue::Uint(v)
    }
}

impl From<f32> for AmqpValue {
    fn from(v: f32) -> Self {
        AmqpValue::Float(OrderedFloat(v))
    }
}

impl From<f64> for AmqpValue {
    fn from(v: f64) -> Self {
        AmqpValue::Double(OrderedFloat(v))
    }
}

impl From<Decimal> for AmqpValue {
    fn from(v: Decimal) -> Self {
        AmqpValue::Decimal(v)
    }
}

impl From<ShortStr> for AmqpValue {
    fn from(v: ShortStr) -> Self {
        AmqpValue::ShortString(v)
    }
}

impl From<ByteString> for AmqpValue {
    fn from(s: ByteString) -> Self {
        AmqpValue::LongString(s)
    }
}

impl From<String> for AmqpValue {
    fn from(s: String) -> Self {
        AmqpValue::LongString(ByteString::from(s))
    }
}

impl From<&'static str> for AmqpValue {
    fn from(s: &'static str) -> Self {
        AmqpValue::LongString(ByteString::from_static(s))
    }
}

impl From<FieldTable> for AmqpValue {
    fn from(t: FieldTable) -> Self {
        AmqpValue::Table(t)
    }
}

impl From<FieldArray> for AmqpValue {
    fn from(a: FieldArray) -> Self {
        AmqpValue::Array(a)
    }
}

impl From<Vec<AmqpValue>> for AmqpValue {
    fn from(items: Vec<AmqpValue>) -> Self {
        AmqpValue::Array(FieldArray(items))
    }
}

impl<T: Into<AmqpValue>> From<Option<T>> for AmqpValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AmqpValue::Void, Into::into)
    }
}

/// Generic integers map to `long-uint`.
impl TryFrom<i64> for AmqpValue {
    type Error = AmqpEncodeError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u32::try_from(v)
            .map(AmqpValue::Uint)
            .map_err(|_| AmqpEncodeError::Overflow)
    }
}

impl TryFrom<u64> for AmqpValue {
    type Error = AmqpEncodeError;

    fn try_from(v: u64) -> Result<Self, Self::Error> {
        u32::try_from(v)
            .map(AmqpValue::Uint)
            .map_err(|_| AmqpEncodeError::Overflow)
    }
}

impl PartialEq<str> for AmqpValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

pub fn timestamp_to_datetime(ts: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(ts).ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Sub-second precision is dropped.
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Option<u64> {
    u64::try_from(dt.timestamp()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &AmqpValue) -> Bytes {
        let mut buf = BytesMut::with_capacity(value.encoded_size());
        value.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), value.encoded_size());
        buf.freeze()
    }

    fn recode(value: AmqpValue) {
        let mut data = encode(&value);
        assert_eq!(data[0], value.tag().as_byte());
        assert_eq!(AmqpValue::decode(&mut data).unwrap(), value);
        assert!(data.is_empty());
    }

    #[test]
    fn scalar_recoding() {
        recode(AmqpValue::Void);
        recode(AmqpValue::Bool(true));
        recode(AmqpValue::Byte(i8::MIN));
        recode(AmqpValue::Ubyte(u8::MAX));
        recode(AmqpValue::Short(-1));
        recode(AmqpValue::Ushort(u16::MAX));
        recode(AmqpValue::Int(i32::MIN));
        recode(AmqpValue::Uint(u32::MAX));
        recode(AmqpValue::Long(i64::MAX));
        recode(AmqpValue::Ulong(u64::MAX));
        recode(AmqpValue::Float(OrderedFloat(-0.5)));
        recode(AmqpValue::Double(OrderedFloat(1e300)));
        recode(AmqpValue::Decimal(Decimal::new(2, -12345)));
        recode(AmqpValue::ShortString(ShortStr::from("short")));
        recode(AmqpValue::LongString(ByteString::from("long")));
        recode(AmqpValue::Timestamp(1_311_704_463));
    }

    #[test]
    fn void_has_no_payload() {
        assert_eq!(&encode(&AmqpValue::Void)[..], b"V");
    }

    #[test]
    fn tagged_layout() {
        assert_eq!(&encode(&AmqpValue::Uint(42))[..], b"i\x00\x00\x00\x2a");
        assert_eq!(&encode(&AmqpValue::Int(-1))[..], b"I\xff\xff\xff\xff");
        assert_eq!(&encode(&AmqpValue::Bool(true))[..], b"t\x01");
        assert_eq!(
            &encode(&AmqpValue::ShortString(ShortStr::from("AB")))[..],
            b"s\x02AB"
        );
    }

    #[test]
    fn unknown_tag() {
        let mut data = Bytes::from_static(b"x\x00");
        assert_eq!(
            AmqpValue::decode(&mut data),
            Err(AmqpParseError::UnknownTypeTag(b'x'))
        );
    }

    #[test]
    fn generic_integers() {
        assert_eq!(AmqpValue::try_from(42_i64), Ok(AmqpValue::Uint(42)));
        assert_eq!(
            AmqpValue::try_from(-1_i64),
            Err(AmqpEncodeError::Overflow)
        );
        assert_eq!(
            AmqpValue::try_from(u64::from(u32::MAX) + 1),
            Err(AmqpEncodeError::Overflow)
        );
    }

    #[test]
    fn option_maps_to_void() {
        assert_eq!(AmqpValue::from(None::<bool>), AmqpValue::Void);
        assert_eq!(AmqpValue::from(Some(true)), AmqpValue::Bool(true));
    }

    #[test]
    fn accessors() {
        assert_eq!(AmqpValue::from("x").as_str(), Some("x"));
        assert!(AmqpValue::from("x").eq("x"));
        assert_eq!(AmqpValue::Short(-3).as_long(), Some(-3));
        assert_eq!(AmqpValue::Ulong(3).as_long(), None);
        assert_eq!(AmqpValue::Ulong(3).as_ulong(), Some(3));
        assert_eq!(AmqpValue::Bool(false).as_bool(), Some(false));
        assert!(AmqpValue::Void.is_void());
    }

    #[test]
    fn timestamps() {
        let dt = AmqpValue::Timestamp(1_311_704_463).as_datetime().unwrap();
        assert_eq!(Utc.with_ymd_and_hms(2011, 7, 26, 18, 21, 3).single(), Some(dt));
        assert_eq!(datetime_to_timestamp(dt), Some(1_311_704_463));
        assert_eq!(timestamp_to_datetime(u64::MAX), None);
    }
}
