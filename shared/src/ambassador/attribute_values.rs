use crate::types::AttributeHandle;

/// Snapshot of attribute payloads carried by an update or a reflection
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeValues {
    pairs: Vec<(AttributeHandle, Vec<u8>)>,
}

impl AttributeValues {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    pub fn single(attribute: AttributeHandle, bytes: Vec<u8>) -> Self {
        Self {
            pairs: vec![(attribute, bytes)],
        }
    }

    pub fn push(&mut self, attribute: AttributeHandle, bytes: Vec<u8>) {
        self.pairs.push((attribute, bytes));
    }

    /// Latest payload for the attribute, if present
    pub fn get(&self, attribute: AttributeHandle) -> Option<&[u8]> {
        self.pairs
            .iter()
            .rev()
            .find(|(handle, _)| *handle == attribute)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeHandle, &[u8])> {
        self.pairs
            .iter()
            .map(|(handle, bytes)| (*handle, bytes.as_slice()))
    }

    pub fn handles(&self) -> Vec<AttributeHandle> {
        self.pairs.iter().map(|(handle, _)| *handle).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(AttributeHandle, Vec<u8>)> for AttributeValues {
    fn from_iter<I: IntoIterator<Item = (AttributeHandle, Vec<u8>)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
