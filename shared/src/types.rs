use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use hla_sim_serde::{decode_object, encode_object, ByteReader, ByteWriter, Serde, SerdeErr};
use serde::{Deserialize, Serialize};

pub type LogicalTime = f64;

macro_rules! rti_handle {
    ($name:ident, $label:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            pub fn value(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

rti_handle!(ObjectHandle, "object");
rti_handle!(ClassHandle, "class");
rti_handle!(AttributeHandle, "attribute");
rti_handle!(FederateHandle, "federate");

/// Which side of the coupling rendezvous a federate plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FederateRole {
    /// Created the federation execution, waits for everyone and broadcasts the session id
    Leader,
    Follower,
}

impl FederateRole {
    pub fn is_leader(self) -> bool {
        self == FederateRole::Leader
    }
}

/// Execution identifier agreed by every federate during coupling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// A fresh id from the wall clock, in milliseconds since the epoch
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        Self(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

impl Serde for SessionId {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        encode_object(self, writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        decode_object(reader)
    }
}

/// Integer grid position, carried through the object stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Serde for Point {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        encode_object(self, writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        decode_object(reader)
    }
}
