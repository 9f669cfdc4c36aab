use crate::{byte_reader::ByteReader, byte_writer::ByteWriter, error::SerdeErr};

/// A value that can be carried as an attribute payload
pub trait Serde: Sized + Clone + PartialEq {
    /// Append this value to the writer
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr>;

    /// Read a value from the reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}

/// Encode a single value into a standalone payload
pub fn encode<T: Serde>(value: &T) -> Result<Vec<u8>, SerdeErr> {
    let mut writer = ByteWriter::new();
    value.ser(&mut writer)?;
    Ok(writer.to_bytes())
}

/// Decode a standalone payload, rejecting trailing bytes
pub fn decode<T: Serde>(bytes: &[u8]) -> Result<T, SerdeErr> {
    let mut reader = ByteReader::new(bytes);
    let value = T::de(&mut reader)?;
    if reader.remaining() > 0 {
        return Err(SerdeErr::TrailingBytes {
            type_name: std::any::type_name::<T>(),
            trailing: reader.remaining(),
        });
    }
    Ok(value)
}
