use serde::{de::DeserializeOwned, Serialize};

use crate::{byte_reader::ByteReader, byte_writer::ByteWriter, codec::Serde, error::SerdeErr};

/// Write a structured value as an i32 length prefix followed by its bincode stream
pub fn encode_object<T: Serialize>(value: &T, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
    let bytes = bincode::serialize(value).map_err(|error| SerdeErr::Object {
        message: error.to_string(),
    })?;
    let length = i32::try_from(bytes.len()).map_err(|_| SerdeErr::InvalidLength { length: -1 })?;
    length.ser(writer)?;
    writer.write_bytes(&bytes);
    Ok(())
}

/// Read a structured value written by [`encode_object`]
pub fn decode_object<T: DeserializeOwned>(reader: &mut ByteReader) -> Result<T, SerdeErr> {
    let length = i32::de(reader)?;
    let length = usize::try_from(length).map_err(|_| SerdeErr::InvalidLength { length })?;
    let bytes = reader.read_slice(length)?;
    bincode::deserialize(bytes).map_err(|error| SerdeErr::Object {
        message: error.to_string(),
    })
}
