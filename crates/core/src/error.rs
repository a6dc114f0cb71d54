//! Error types for DRID descriptor computation.

use thiserror::Error;

/// Errors raised while validating input or computing descriptors.
///
/// Every precondition is checked before the first frame is processed, so a
/// caller either receives a complete descriptor array or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DridError {
    /// Fewer than two atoms, so no atom has a neighbor to measure against.
    #[error("at least 2 atoms are required, got {n_atoms}")]
    InsufficientAtoms { n_atoms: usize },

    /// A bond references an atom outside `[0, n_atoms)`.
    #[error("bond ({a}, {b}) references an atom outside [0, {n_atoms})")]
    InvalidBondIndex { a: usize, b: usize, n_atoms: usize },

    /// A bond connects an atom to itself.
    #[error("bond ({atom}, {atom}) connects an atom to itself")]
    SelfBond { atom: usize },

    /// An atom subset entry is outside `[0, n_atoms)`.
    #[error("atom index {index} is outside [0, {n_atoms})")]
    InvalidAtomIndex { index: usize, n_atoms: usize },

    /// An atom subset lists the same atom twice.
    #[error("atom index {index} appears more than once in the atom selection")]
    DuplicateAtomIndex { index: usize },

    /// Coordinate data does not have the expected shape.
    #[error("coordinate shape mismatch: {0}")]
    ShapeMismatch(String),

    /// An atom is excluded from (bonded to) every other atom, so its moments
    /// are undefined. Only raised under [`EmptyRowPolicy::Error`](crate::drid::EmptyRowPolicy::Error).
    #[error("atom {atom} has no unexcluded neighbors")]
    EmptyNeighborRow { atom: usize },

    /// The computation was cancelled before the given frame was processed.
    #[error("computation cancelled at frame {frame}")]
    Cancelled { frame: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DridError>;

impl From<DridError> for String {
    fn from(e: DridError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DridError::InvalidBondIndex { a: 3, b: 12, n_atoms: 10 };
        assert_eq!(
            err.to_string(),
            "bond (3, 12) references an atom outside [0, 10)"
        );

        let err = DridError::SelfBond { atom: 4 };
        assert_eq!(err.to_string(), "bond (4, 4) connects an atom to itself");

        let msg: String = DridError::InsufficientAtoms { n_atoms: 1 }.into();
        assert!(msg.contains("got 1"));
    }
}
