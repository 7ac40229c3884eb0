//! Electromechanical rotor cipher machine simulator.
//!
//! Simulates a historical rotor cipher machine symbol by symbol: each
//! input passes through a plugboard, a chain of rotors with configurable
//! permutations and positions, a reflector, and back out again. The
//! machine reproduces the original device's multi-rotor stepping rule
//! exactly, including the double-stepping anomaly.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbol <-> index mapping, shared by everything below)
//!     ↕
//! Permutation  (cycle-notation bijection over alphabet indices)
//!     ↕ one per rotor, plus the plugboard
//! Rotor        (permutation + rotational offset; reflector / fixed / moving)
//!     ↕ ordered bank, reflector leftmost
//! Machine      (orchestrator — stepping decisions + double signal pass)
//! ```
//!
//! The [`config`] module supplies the text front end: configuration
//! descriptions, setup directives and display grouping.
//!
//! # Examples
//!
//! Configure a machine and convert a message:
//!
//! ```
//! use enigma::{Alphabet, Machine, Permutation, Rotor};
//! use std::collections::HashMap;
//!
//! let alpha = Alphabet::default();
//! let perm = |cycles: &str| Permutation::new(cycles, alpha.clone()).unwrap();
//!
//! let mut catalog = HashMap::new();
//! catalog.insert(
//!     "B".to_string(),
//!     Rotor::reflector(
//!         "B",
//!         perm("(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)"),
//!     )
//!     .unwrap(),
//! );
//! catalog.insert(
//!     "I".to_string(),
//!     Rotor::moving("I", perm("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"), "Q").unwrap(),
//! );
//! catalog.insert(
//!     "II".to_string(),
//!     Rotor::moving("II", perm("(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT)"), "E").unwrap(),
//! );
//! catalog.insert(
//!     "III".to_string(),
//!     Rotor::moving("III", perm("(ABDHPEJT) (CFLVMZOYQIRWUKXSG)"), "V").unwrap(),
//! );
//!
//! let mut machine = Machine::new(alpha, 4, 3, catalog).unwrap();
//! machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
//! machine.set_rotors("AAA").unwrap();
//! assert_eq!(machine.convert_text("AAAAA").unwrap(), "BDZGO");
//! ```
//!
//! The cipher is reciprocal: resetting the machine to the same starting
//! settings and feeding the ciphertext back reproduces the plaintext.

#![deny(clippy::all)]

pub mod config;
pub mod error;

mod alphabet;
mod machine;
mod permutation;
mod rotor;

pub use alphabet::Alphabet;
pub use error::EnigmaError;
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};
