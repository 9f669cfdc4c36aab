use crate::error::SerdeErr;

/// Cursor over an attribute payload
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    position: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let slice = self.read_slice(N)?;
        let mut output = [0u8; N];
        output.copy_from_slice(slice);
        Ok(output)
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'b [u8], SerdeErr> {
        if self.remaining() < length {
            return Err(SerdeErr::UnexpectedEnd {
                needed: length,
                remaining: self.remaining(),
            });
        }
        let buffer = self.buffer;
        let start = self.position;
        self.position += length;
        Ok(&buffer[start..self.position])
    }
}
