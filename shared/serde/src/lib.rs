//! # hla-sim serde
//! Encodes public variable values into the byte payloads carried by attribute updates.
//!
//! Primitive values use fixed-width big-endian layouts (IEEE 754 for floats). Structured
//! values go through a length-prefixed bincode stream, which only has to round-trip between
//! federates built against the same types.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod codec;
mod error;
mod impls;
mod object;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use codec::{decode, encode, Serde};
pub use error::SerdeErr;
pub use object::{decode_object, encode_object};
