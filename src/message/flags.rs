use ntex_bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{read_u16, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};

/// Number of presence flags carried by one flags word.
pub const FLAGS_PER_WORD: usize = 15;

const CONTINUATION: u16 = 0x0001;

/// Presence bitmap for an ordered list of optional fields.
///
/// Fields map to bits 15..1 of consecutive 16-bit words, bit 0 of a word
/// announces that another word follows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyFlags {
    flags: Vec<bool>,
}

impl PropertyFlags {
    /// Bitmap for `count` fields, none of them present.
    pub fn new(count: usize) -> PropertyFlags {
        PropertyFlags {
            flags: vec![false; count],
        }
    }

    pub fn from_presence<I: IntoIterator<Item = bool>>(iter: I) -> PropertyFlags {
        PropertyFlags {
            flags: iter.into_iter().collect(),
        }
    }

    /// Number of fields covered.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Fields past the end of the bitmap are reported absent.
    pub fn is_set(&self, idx: usize) -> bool {
        self.flags.get(idx).copied().unwrap_or(false)
    }

    pub fn set(&mut self, idx: usize, present: bool) -> &mut Self {
        if idx >= self.flags.len() {
            self.flags.resize(idx + 1, false);
        }
        self.flags[idx] = present;
        self
    }

    /// Words needed on the wire, at least one.
    pub fn word_count(&self) -> usize {
        self.flags.len().div_ceil(FLAGS_PER_WORD).max(1)
    }

    /// Flags word `idx` as transmitted, including the continuation bit.
    pub fn word(&self, idx: usize) -> u16 {
        let start = idx * FLAGS_PER_WORD;
        let mut word = self
            .flags
            .iter()
            .skip(start)
            .take(FLAGS_PER_WORD)
            .enumerate()
            .fold(0u16, |acc, (pos, present)| {
                acc | (u16::from(*present) << (15 - pos))
            });
        if idx + 1 < self.word_count() {
            word |= CONTINUATION;
        }
        word
    }

    /// Decodes flags words up to the first one without continuation bit.
    pub fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        Self::decode_words(input, usize::MAX)
    }

    /// Decodes flags for a record of at most `fields` fields.
    ///
    /// A continuation bit on a word that already covers all fields fails
    /// with `UnexpectedContinuation`.
    pub fn decode_for(input: &mut Bytes, fields: usize) -> Result<Self, AmqpParseError> {
        Self::decode_words(input, fields)
    }

    fn decode_words(input: &mut Bytes, fields: usize) -> Result<Self, AmqpParseError> {
        let mut flags = Vec::with_capacity(FLAGS_PER_WORD);
        loop {
            let word = read_u16(input).map_err(|_| AmqpParseError::TruncatedFlags)?;
            flags.extend((0..FLAGS_PER_WORD).map(|pos| word & (1 << (15 - pos)) != 0));
            if word & CONTINUATION == 0 {
                break;
            }
            if flags.len() >= fields {
                return Err(AmqpParseError::UnexpectedContinuation);
            }
        }
        Ok(PropertyFlags { flags })
    }
}

impl Encode for PropertyFlags {
    fn encoded_size(&self) -> usize {
        self.word_count() * 2
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        for idx in 0..self.word_count() {
            buf.put_u16(self.word(idx));
        }
        Ok(())
    }
}
