mod flags;
mod properties;

pub use self::flags::{PropertyFlags, FLAGS_PER_WORD};
pub use self::properties::{MessageProperties, PropertyMask, PROPERTY_COUNT};
