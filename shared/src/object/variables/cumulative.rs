use std::{any::Any, ops::Add};

use hla_sim_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::object::{
    ownership::{OwnershipState, VariableKind},
    public_variable::{PublicVariable, VariableState},
    variables::value_cell::{ValueCell, VariableListener},
};

const DELTA: u8 = 0;
const ABSOLUTE: u8 = 1;

/// A variable every federate may append to
///
/// Local writes publish only the delta applied since the last publish, and reflections
/// add the received delta to the local value. Registration snapshots and refreshes carry
/// the full value instead, tagged so that receivers overwrite rather than add.
pub struct Cumulative<T> {
    cell: ValueCell<T>,
    pending: Option<T>,
    state: VariableState,
}

impl<T> Cumulative<T>
where
    T: Serde + Copy + Add<Output = T>,
{
    pub fn new(value: T) -> Self {
        let mut state = VariableState::new(OwnershipState::Ambiguous);
        state.mark_value();
        Self {
            cell: ValueCell::new(value),
            pending: None,
            state,
        }
    }

    pub fn get(&self) -> T {
        *self.cell.get()
    }

    pub fn add(&mut self, delta: T) {
        self.pending = Some(match self.pending {
            Some(pending) => pending + delta,
            None => delta,
        });
        self.cell.replace(*self.cell.get() + delta);
        self.state.mark_value();
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&T, &T) + 'static) {
        let listener: VariableListener<T> = Box::new(listener);
        self.cell.add_listener(listener);
    }
}

impl<T> Default for Cumulative<T>
where
    T: Serde + Copy + Default + Add<Output = T>,
{
    fn default() -> Self {
        Self {
            cell: ValueCell::new(T::default()),
            pending: None,
            state: VariableState::new(OwnershipState::Ambiguous),
        }
    }
}

impl<T> PublicVariable for Cumulative<T>
where
    T: Serde + Copy + Add<Output = T> + 'static,
{
    fn kind(&self) -> VariableKind {
        VariableKind::Cumulative
    }

    fn state(&self) -> &VariableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariableState {
        &mut self.state
    }

    fn encode(&self) -> Result<Vec<u8>, SerdeErr> {
        tagged(ABSOLUTE, self.cell.get())
    }

    fn take_outgoing(&mut self) -> Result<Vec<u8>, SerdeErr> {
        match self.pending.take() {
            Some(delta) => tagged(DELTA, &delta),
            None => self.encode(),
        }
    }

    fn reflect(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        let mut reader = ByteReader::new(bytes);
        let tag = reader.read_byte()?;
        let value = T::de(&mut reader)?;
        if reader.remaining() > 0 {
            return Err(SerdeErr::TrailingBytes {
                type_name: std::any::type_name::<T>(),
                trailing: reader.remaining(),
            });
        }
        let next = match tag {
            DELTA => *self.cell.get() + value,
            ABSOLUTE => value,
            byte => return Err(SerdeErr::InvalidTag { byte }),
        };
        self.cell.replace(next);
        self.state.mark_value();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn tagged<T: Serde>(tag: u8, value: &T) -> Result<Vec<u8>, SerdeErr> {
    let mut writer = ByteWriter::new();
    writer.write_byte(tag);
    value.ser(&mut writer)?;
    Ok(writer.to_bytes())
}
