//! Error types for the enigma library.

use thiserror::Error;

/// Errors produced by the enigma library.
///
/// Configuration errors (`UnknownRotor`, `IncompleteSettings`, the
/// structural variants) are fatal to the current setup attempt but not to
/// the process: the machine is left usable and a later setup may succeed.
/// `InvalidSymbol` is recoverable by the caller rejecting the offending
/// message. None of these are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnigmaError {
    /// An alphabet was constructed from an empty symbol sequence.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,
    /// A symbol appears more than once in an alphabet.
    #[error("symbol '{0}' appears more than once in the alphabet")]
    DuplicateSymbol(char),
    /// A symbol outside the configured alphabet was presented.
    #[error("symbol '{0}' is not in the alphabet")]
    InvalidSymbol(char),
    /// A cycle specification has unbalanced grouping, an empty group,
    /// a stray symbol outside any group, or repeats a symbol.
    #[error("malformed cycle specification: {0}")]
    MalformedCycles(String),
    /// A reflector was given a permutation that maps some symbol to itself.
    #[error("reflector '{0}' wiring is not a derangement")]
    ReflectorNotDerangement(String),
    /// A reflector was asked to move off its fixed zero position.
    #[error("reflector '{0}' cannot be set to a non-zero position")]
    ReflectorSetting(String),
    /// A notch symbol of a rotating rotor is outside the alphabet.
    #[error("rotor '{name}' has notch '{notch}' outside its alphabet")]
    InvalidNotch { name: String, notch: char },
    /// A requested rotor name is absent from the machine's catalog.
    #[error("rotor '{0}' is not in the catalog")]
    UnknownRotor(String),
    /// The number of rotor names does not match the machine's slot count.
    #[error("machine has {expected} rotor slots but {given} names were given")]
    WrongRotorCount { expected: usize, given: usize },
    /// The inserted rotors violate slot conventions: the reflector must
    /// occupy slot 0 and nothing else may reflect, and rotating rotors
    /// must form a contiguous suffix of at most the pawl count.
    #[error("invalid rotor arrangement: {0}")]
    BadArrangement(String),
    /// The initial-setting string does not cover every non-reflector slot.
    #[error("initial settings given for {given} rotors, machine needs {needed}")]
    IncompleteSettings { needed: usize, given: usize },
    /// Slot/pawl counts outside the supported range (need `1 < rotors` and
    /// `pawls < rotors`).
    #[error("invalid machine geometry: {rotors} rotor slots, {pawls} pawls")]
    BadGeometry { rotors: usize, pawls: usize },
    /// A configuration description could not be parsed.
    #[error("bad configuration: {0}")]
    BadConfig(String),
    /// A setup directive could not be parsed.
    #[error("bad setup directive: {0}")]
    BadDirective(String),
    /// Input arrived before any setup directive configured the machine.
    #[error("input precedes the first setup directive")]
    MissingSetup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_symbol() {
        let err = EnigmaError::InvalidSymbol('%');
        assert_eq!(format!("{}", err), "symbol '%' is not in the alphabet");
    }

    #[test]
    fn test_display_unknown_rotor() {
        let err = EnigmaError::UnknownRotor("VIII".to_string());
        assert_eq!(format!("{}", err), "rotor 'VIII' is not in the catalog");
    }

    #[test]
    fn test_display_incomplete_settings() {
        let err = EnigmaError::IncompleteSettings { needed: 4, given: 2 };
        assert_eq!(
            format!("{}", err),
            "initial settings given for 2 rotors, machine needs 4"
        );
    }

    #[test]
    fn test_display_bad_geometry() {
        let err = EnigmaError::BadGeometry { rotors: 1, pawls: 3 };
        assert_eq!(
            format!("{}", err),
            "invalid machine geometry: 1 rotor slots, 3 pawls"
        );
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(EnigmaError::EmptyAlphabet);
        assert_eq!(err.to_string(), "alphabet must contain at least one symbol");
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(
            EnigmaError::InvalidSymbol('a'),
            EnigmaError::InvalidSymbol('a')
        );
        assert_ne!(
            EnigmaError::InvalidSymbol('a'),
            EnigmaError::InvalidSymbol('b')
        );
    }
}
