use thiserror::Error;

/// Errors raised while decoding attribute payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Reader ran out of bytes
    #[error("Unexpected end of payload: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// Bytes were left over after the value was decoded
    #[error("{trailing} trailing bytes after decoding {type_name}")]
    TrailingBytes {
        type_name: &'static str,
        trailing: usize,
    },

    /// A boolean byte other than 0 or 1
    #[error("Invalid boolean byte {byte:#04x}")]
    InvalidBool { byte: u8 },

    /// Length prefix was negative
    #[error("Invalid payload tag {byte:#04x}")]
    InvalidTag { byte: u8 },

    #[error("Invalid length prefix {length}")]
    InvalidLength { length: i32 },

    /// String payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// The object stream failed to encode or decode
    #[error("Object stream error: {message}")]
    Object { message: String },
}
