/// Who may write a public variable right now
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnershipState {
    /// This federate may write, and must publish what it writes
    Owned,
    NotOwned,
    /// An outcome is pending, or ownership was reset at the end of a tick
    Ambiguous,
}

/// Conflict-resolution policy, fixed by the variable's type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// One acquisition attempt per tick
    Exclusive,
    /// Acquisition retried until granted, released straight after each write
    Cumulative,
    /// Owned by the registering federate only
    Viewable,
    /// Always owned locally, never published
    Dummy,
}

impl VariableKind {
    /// Whether ownership of this kind is divested back to Ambiguous every tick
    pub fn is_negotiated(self) -> bool {
        matches!(self, VariableKind::Exclusive | VariableKind::Cumulative)
    }
}

/// Outcome of asking the RTI for an attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnershipRequestStatus {
    /// The RTI granted the attribute to this federate
    Granted,
    /// The request is outstanding; the answer arrives through a callback
    Pending,
    /// Another federate holds the attribute
    Unavailable,
    /// This federate held the attribute before asking
    AlreadyOwned,
}

impl OwnershipRequestStatus {
    /// Whether the caller may write the attribute now
    pub fn is_owned(self) -> bool {
        matches!(
            self,
            OwnershipRequestStatus::Granted | OwnershipRequestStatus::AlreadyOwned
        )
    }
}
