use chrono::{DateTime, Utc};
use ntex_bytes::{Bytes, BytesMut};

use super::flags::PropertyFlags;
use crate::codec::{Decode, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};
use crate::types::{timestamp_to_datetime, FieldTable, ShortStr};

/// Number of fields of the basic content header.
pub const PROPERTY_COUNT: usize = 14;

bitflags::bitflags! {
    /// Flags word of the basic content header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyMask: u16 {
        const CONTENT_TYPE     = 1 << 15;
        const CONTENT_ENCODING = 1 << 14;
        const HEADERS          = 1 << 13;
        const DELIVERY_MODE    = 1 << 12;
        const PRIORITY         = 1 << 11;
        const CORRELATION_ID   = 1 << 10;
        const REPLY_TO         = 1 << 9;
        const EXPIRATION       = 1 << 8;
        const MESSAGE_ID       = 1 << 7;
        const TIMESTAMP        = 1 << 6;
        const TYPE             = 1 << 5;
        const USER_ID          = 1 << 4;
        const APP_ID           = 1 << 3;
        const CLUSTER_ID       = 1 << 2;
    }
}

/// Content header properties of the basic class.
///
/// Every field is optional, an absent field takes no space on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MessageProperties {
    pub content_type: Option<ShortStr>,
    pub content_encoding: Option<ShortStr>,
    pub headers: Option<FieldTable>,
    pub delivery_mode: Option<u8>,
    pub priority: Option<u8>,
    pub correlation_id: Option<ShortStr>,
    pub reply_to: Option<ShortStr>,
    pub expiration: Option<ShortStr>,
    pub message_id: Option<ShortStr>,
    pub timestamp: Option<u64>,
    pub message_type: Option<ShortStr>,
    pub user_id: Option<ShortStr>,
    pub app_id: Option<ShortStr>,
    pub cluster_id: Option<ShortStr>,
}

impl MessageProperties {
    #[inline]
    /// Set content type
    pub fn with_content_type<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.content_type = Some(value.into());
        self
    }

    #[inline]
    /// Set content encoding
    pub fn with_content_encoding<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.content_encoding = Some(value.into());
        self
    }

    #[inline]
    /// Set application headers
    pub fn with_headers(mut self, headers: FieldTable) -> Self {
        self.headers = Some(headers);
        self
    }

    #[inline]
    /// Set delivery mode, 1 for transient and 2 for persistent
    pub fn with_delivery_mode(mut self, mode: u8) -> Self {
        self.delivery_mode = Some(mode);
        self
    }

    #[inline]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    #[inline]
    pub fn with_correlation_id<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.correlation_id = Some(value.into());
        self
    }

    #[inline]
    pub fn with_reply_to<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.reply_to = Some(value.into());
        self
    }

    #[inline]
    pub fn with_expiration<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.expiration = Some(value.into());
        self
    }

    #[inline]
    pub fn with_message_id<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.message_id = Some(value.into());
        self
    }

    #[inline]
    pub fn with_timestamp(mut self, ts: u64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    #[inline]
    pub fn with_message_type<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.message_type = Some(value.into());
        self
    }

    #[inline]
    pub fn with_user_id<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.user_id = Some(value.into());
        self
    }

    #[inline]
    pub fn with_app_id<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.app_id = Some(value.into());
        self
    }

    #[inline]
    pub fn with_cluster_id<T: Into<ShortStr>>(mut self, value: T) -> Self {
        self.cluster_id = Some(value.into());
        self
    }

    pub fn timestamp_datetime(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(timestamp_to_datetime)
    }

    /// Presence of each field, in wire order.
    fn presence(&self) -> [bool; PROPERTY_COUNT] {
        [
            self.content_type.is_some(),
            self.content_encoding.is_some(),
            self.headers.is_some(),
            self.delivery_mode.is_some(),
            self.priority.is_some(),
            self.correlation_id.is_some(),
            self.reply_to.is_some(),
            self.expiration.is_some(),
            self.message_id.is_some(),
            self.timestamp.is_some(),
            self.message_type.is_some(),
            self.user_id.is_some(),
            self.app_id.is_some(),
            self.cluster_id.is_some(),
        ]
    }

    pub fn flags(&self) -> PropertyFlags {
        PropertyFlags::from_presence(self.presence())
    }

    pub fn mask(&self) -> PropertyMask {
        PropertyMask::from_bits_truncate(self.flags().word(0))
    }

    fn fields_size(&self) -> usize {
        fn size<T: Encode>(field: &Option<T>) -> usize {
            field.as_ref().map_or(0, Encode::encoded_size)
        }

        size(&self.content_type)
            + size(&self.content_encoding)
            + size(&self.headers)
            + size(&self.delivery_mode)
            + size(&self.priority)
            + size(&self.correlation_id)
            + size(&self.reply_to)
            + size(&self.expiration)
            + size(&self.message_id)
            + size(&self.timestamp)
            + size(&self.message_type)
            + size(&self.user_id)
            + size(&self.app_id)
            + size(&self.cluster_id)
    }
}

fn encode_field<T: Encode>(field: &Option<T>, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
    match field {
        Some(value) => value.encode(buf),
        None => Ok(()),
    }
}

fn decode_field<T: Decode>(
    flags: &PropertyFlags,
    idx: usize,
    input: &mut Bytes,
) -> Result<Option<T>, AmqpParseError> {
    if flags.is_set(idx) {
        T::decode(input).map(Some)
    } else {
        Ok(None)
    }
}

impl Encode for MessageProperties {
    fn encoded_size(&self) -> usize {
        2 + self.fields_size()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        self.flags().encode(buf)?;
        encode_field(&self.content_type, buf)?;
        encode_field(&self.content_encoding, buf)?;
        encode_field(&self.headers, buf)?;
        encode_field(&self.delivery_mode, buf)?;
        encode_field(&self.priority, buf)?;
        encode_field(&self.correlation_id, buf)?;
        encode_field(&self.reply_to, buf)?;
        encode_field(&self.expiration, buf)?;
        encode_field(&self.message_id, buf)?;
        encode_field(&self.timestamp, buf)?;
        encode_field(&self.message_type, buf)?;
        encode_field(&self.user_id, buf)?;
        encode_field(&self.app_id, buf)?;
        encode_field(&self.cluster_id, buf)
    }
}

impl Decode for MessageProperties {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let flags = PropertyFlags::decode_for(input, PROPERTY_COUNT)?;
        Ok(MessageProperties {
            content_type: decode_field(&flags, 0, input)?,
            content_encoding: decode_field(&flags, 1, input)?,
            headers: decode_field(&flags, 2, input)?,
            delivery_mode: decode_field(&flags, 3, input)?,
            priority: decode_field(&flags, 4, input)?,
            correlation_id: decode_field(&flags, 5, input)?,
            reply_to: decode_field(&flags, 6, input)?,
            expiration: decode_field(&flags, 7, input)?,
            message_id: decode_field(&flags, 8, input)?,
            timestamp: decode_field(&flags, 9, input)?,
            message_type: decode_field(&flags, 10, input)?,
            user_id: decode_field(&flags, 11, input)?,
            app_id: decode_field(&flags, 12, input)?,
            cluster_id: decode_field(&flags, 13, input)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AmqpValue;

    fn encode(props: &MessageProperties) -> Bytes {
        let mut buf = BytesMut::with_capacity(props.encoded_size());
        props.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), props.encoded_size());
        buf.freeze()
    }

    fn all_fields() -> MessageProperties {
        let mut headers = FieldTable::new();
        headers.insert("x-retries", 3_u32);

        MessageProperties::default()
            .with_content_type("application/json")
            .with_content_encoding("gzip")
            .with_headers(headers)
            .with_delivery_mode(2)
            .with_priority(9)
            .with_correlation_id("corr-1")
            .with_reply_to("amq.rabbitmq.reply-to")
            .with_expiration("60000")
            .with_message_id("msg-1")
            .with_timestamp(1_311_704_463)
            .with_message_type("order.created")
            .with_user_id("guest")
            .with_app_id("shop")
            .with_cluster_id("c1")
    }

    #[test]
    fn content_type_only() {
        let props = MessageProperties::default().with_content_type("text/plain");
        assert_eq!(&encode(&props)[..], b"\x80\x00\x0atext/plain");
        assert_eq!(props.mask(), PropertyMask::CONTENT_TYPE);
    }

    #[test]
    fn empty_record() {
        let props = MessageProperties::default();
        let mut data = encode(&props);
        assert_eq!(&data[..], b"\x00\x00");
        assert_eq!(MessageProperties::decode(&mut data).unwrap(), props);
    }

    #[test]
    fn partial_record() {
        let props = MessageProperties::default()
            .with_delivery_mode(1)
            .with_timestamp(42)
            .with_app_id("app");
        let mut data = encode(&props);
        assert_eq!(&data[..2], b"\x10\x48");
        assert_eq!(
            &data[2..],
            b"\x01\x00\x00\x00\x00\x00\x00\x00\x2a\x03app"
        );
        assert_eq!(MessageProperties::decode(&mut data).unwrap(), props);
        assert!(data.is_empty());
    }

    #[test]
    fn full_record() {
        let props = all_fields();
        let mut data = encode(&props);
        assert_eq!(&data[..2], b"\xff\xfc");
        assert_eq!(data[1] & 0x01, 0);
        assert!(props.mask().is_all());

        let decoded = MessageProperties::decode(&mut data).unwrap();
        assert!(data.is_empty());
        assert_eq!(decoded, props);
        assert_eq!(
            decoded.headers.as_ref().and_then(|h| h.get("x-retries")),
            Some(&AmqpValue::Uint(3))
        );
        assert!(decoded.timestamp_datetime().is_some());
    }

    #[test]
    fn empty_headers_are_present() {
        let props = MessageProperties::default().with_headers(FieldTable::new());
        let mut data = encode(&props);
        assert_eq!(&data[..], b"\x20\x00\x00\x00\x00\x00");
        assert_eq!(
            MessageProperties::decode(&mut data).unwrap().headers,
            Some(FieldTable::new())
        );
    }

    #[test]
    fn continuation_rejected() {
        let mut data = Bytes::from_static(b"\x80\x01\x00\x00\x0atext/plain");
        assert_eq!(
            MessageProperties::decode(&mut data),
            Err(AmqpParseError::UnexpectedContinuation)
        );
    }

    #[test]
    fn truncated_flags() {
        let mut data = Bytes::from_static(b"\x80");
        assert_eq!(
            MessageProperties::decode(&mut data),
            Err(AmqpParseError::TruncatedFlags)
        );
    }

    #[test]
    fn missing_field_bytes() {
        let mut data = Bytes::from_static(b"\x80\x00\x0atext");
        assert_eq!(
            MessageProperties::decode(&mut data),
            Err(AmqpParseError::UnexpectedEof(10))
        );
    }
}
