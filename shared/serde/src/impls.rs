use crate::{byte_reader::ByteReader, byte_writer::ByteWriter, codec::Serde, error::SerdeErr};

macro_rules! impl_serde_for_number {
    ($($ty:ty),*) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
                    writer.write_bytes(&self.to_be_bytes());
                    Ok(())
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                    Ok(<$ty>::from_be_bytes(bytes))
                }
            }
        )*
    };
}

impl_serde_for_number!(u8, i16, i32, i64, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_byte(u8::from(*self));
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(SerdeErr::InvalidBool { byte }),
        }
    }
}

// i32 length prefix, then UTF-8
impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        let length = i32::try_from(self.len()).map_err(|_| SerdeErr::InvalidLength { length: -1 })?;
        length.ser(writer)?;
        writer.write_bytes(self.as_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = i32::de(reader)?;
        let length = usize::try_from(length).map_err(|_| SerdeErr::InvalidLength { length })?;
        let bytes = reader.read_slice(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8)
    }
}
