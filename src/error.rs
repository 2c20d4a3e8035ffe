#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmqpParseError {
    #[error("Not enough data during parsing: {0} bytes required")]
    UnexpectedEof(usize),
    #[error("Unknown field type tag: {0:#04x}")]
    UnknownTypeTag(u8),
    #[error("Declared length does not match consumed bytes")]
    LengthMismatch,
    #[error("Value is not valid utf8 string")]
    InvalidText,
    #[error("Property flags are truncated")]
    TruncatedFlags,
    #[error("Unexpected continuation bit in property flags")]
    UnexpectedContinuation,
    #[error("Invalid frame end marker: {0:#04x}")]
    BadFrameEnd(u8),
    #[error("Unknown frame type: {0}")]
    UnknownFrameType(u8),
    #[error("Heartbeat frame carries {0} payload bytes")]
    MalformedHeartbeat(u32),
    #[error("Unexpected method {class_id}.{method_id}")]
    UnknownMethod { class_id: u16, method_id: u16 },
    #[error("Field tables and arrays nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmqpEncodeError {
    #[error("Value does not fit its target width")]
    Overflow,
    #[error("Encoded length {0} exceeds length prefix capacity")]
    LengthOverflow(usize),
    #[error("Cannot pack {0} bits into one octet")]
    TooManyBits(usize),
    #[error("Cannot parse decimal value")]
    InvalidDecimal,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AmqpCodecError {
    #[error("Parse failed: {0}")]
    Parse(#[from] AmqpParseError),
    #[error("Encode failed: {0}")]
    Encode(#[from] AmqpEncodeError),
    #[error("Max inbound frame size exceeded")]
    MaxSizeExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolHeaderError {
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Incompatible protocol version {major}-{minor}-{revision}")]
    Incompatible { major: u8, minor: u8, revision: u8 },
}
