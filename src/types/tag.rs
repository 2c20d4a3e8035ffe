use std::fmt;

use ntex_bytes::ByteString;

use super::{AmqpValue, FieldArray, FieldTable};
use crate::error::AmqpParseError;

/// Wire tag of a value stored in a field table or field array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = b't',
    Byte = b'b',
    Ubyte = b'B',
    Short = b'U',
    Ushort = b'u',
    Int = b'I',
    Uint = b'i',
    Long = b'l',
    Ulong = b'L',
    Float = b'f',
    Double = b'd',
    Decimal = b'D',
    ShortString = b's',
    LongString = b'S',
    Array = b'A',
    Timestamp = b'T',
    Table = b'F',
    Void = b'V',
}

/// Every tag understood by the codec.
pub const TYPE_TAGS: [TypeTag; 18] = [
    TypeTag::Bool,
    TypeTag::Byte,
    TypeTag::Ubyte,
    TypeTag::Short,
    TypeTag::Ushort,
    TypeTag::Int,
    TypeTag::Uint,
    TypeTag::Long,
    TypeTag::Ulong,
    TypeTag::Float,
    TypeTag::Double,
    TypeTag::Decimal,
    TypeTag::ShortString,
    TypeTag::LongString,
    TypeTag::Array,
    TypeTag::Timestamp,
    TypeTag::Table,
    TypeTag::Void,
];

const BY_BYTE: [Option<TypeTag>; 256] = {
    let mut table = [None; 256];
    let mut idx = 0;
    while idx < TYPE_TAGS.len() {
        table[TYPE_TAGS[idx] as usize] = Some(TYPE_TAGS[idx]);
        idx += 1;
    }
    table
};

impl TypeTag {
    #[inline]
    pub fn from_byte(byte: u8) -> Result<TypeTag, AmqpParseError> {
        BY_BYTE[byte as usize].ok_or(AmqpParseError::UnknownTypeTag(byte))
    }

    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Size of the value following the tag, `None` for length-prefixed types.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeTag::Void => Some(0),
            TypeTag::Bool | TypeTag::Byte | TypeTag::Ubyte => Some(1),
            TypeTag::Short | TypeTag::Ushort => Some(2),
            TypeTag::Int | TypeTag::Uint | TypeTag::Float => Some(4),
            TypeTag::Decimal => Some(5),
            TypeTag::Long | TypeTag::Ulong | TypeTag::Double | TypeTag::Timestamp => Some(8),
            TypeTag::ShortString | TypeTag::LongString | TypeTag::Array | TypeTag::Table => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "boolean",
            TypeTag::Byte => "short-short-int",
            TypeTag::Ubyte => "short-short-uint",
            TypeTag::Short => "short-int",
            TypeTag::Ushort => "short-uint",
            TypeTag::Int => "long-int",
            TypeTag::Uint => "long-uint",
            TypeTag::Long => "long-long-int",
            TypeTag::Ulong => "long-long-uint",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Decimal => "decimal-value",
            TypeTag::ShortString => "short-string",
            TypeTag::LongString => "long-string",
            TypeTag::Array => "field-array",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Table => "field-table",
            TypeTag::Void => "void",
        }
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = AmqpParseError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        TypeTag::from_byte(byte)
    }
}

impl From<TypeTag> for u8 {
    fn from(tag: TypeTag) -> u8 {
        tag.as_byte()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.name(), self.as_byte() as char)
    }
}

/// Native value shapes with a canonical wire tag.
///
/// Used when a value is built generically, through `AmqpValue::from`.
/// Decoding never consults these, it always uses the tag from the stream.
pub trait NativeType: Into<AmqpValue> {
    const DEFAULT_TAG: TypeTag;
}

impl NativeType for bool {
    const DEFAULT_TAG: TypeTag = TypeTag::Bool;
}

impl NativeType for u32 {
    const DEFAULT_TAG: TypeTag = TypeTag::Uint;
}

impl NativeType for &'static str {
    const DEFAULT_TAG: TypeTag = TypeTag::LongString;
}

impl NativeType for String {
    const DEFAULT_TAG: TypeTag = TypeTag::LongString;
}

impl NativeType for ByteString {
    const DEFAULT_TAG: TypeTag = TypeTag::LongString;
}

impl NativeType for FieldTable {
    const DEFAULT_TAG: TypeTag = TypeTag::Table;
}

impl NativeType for FieldArray {
    const DEFAULT_TAG: TypeTag = TypeTag::Array;
}

impl NativeType for Vec<AmqpValue> {
    const DEFAULT_TAG: TypeTag = TypeTag::Array;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_bijective() {
        for tag in TYPE_TAGS {
            assert_eq!(TypeTag::from_byte(tag.as_byte()), Ok(tag));
        }
        let known = (0..=u8::MAX)
            .filter(|b| TypeTag::from_byte(*b).is_ok())
            .count();
        assert_eq!(known, TYPE_TAGS.len());
    }

    #[test]
    fn unknown_tag() {
        for byte in [b'x', b'c', 0, 0xff] {
            assert_eq!(
                TypeTag::try_from(byte),
                Err(AmqpParseError::UnknownTypeTag(byte))
            );
        }
    }

    #[test]
    fn default_tags() {
        fn tag_of<T: NativeType>(value: T) -> (TypeTag, TypeTag) {
            (T::DEFAULT_TAG, Into::<AmqpValue>::into(value).tag())
        }

        let (expected, got) = tag_of(true);
        assert_eq!((expected, got), (TypeTag::Bool, TypeTag::Bool));
        let (expected, got) = tag_of(7_u32);
        assert_eq!((expected, got), (TypeTag::Uint, TypeTag::Uint));
        let (expected, got) = tag_of("text");
        assert_eq!((expected, got), (TypeTag::LongString, TypeTag::LongString));
        let (expected, got) = tag_of(String::from("text"));
        assert_eq!(expected, got);
        let (expected, got) = tag_of(FieldTable::new());
        assert_eq!((expected, got), (TypeTag::Table, TypeTag::Table));
        let (expected, got) = tag_of(vec![AmqpValue::Void]);
        assert_eq!((expected, got), (TypeTag::Array, TypeTag::Array));
    }

    #[test]
    fn display() {
        assert_eq!(TypeTag::Table.to_string(), "field-table ('F')");
    }
}
