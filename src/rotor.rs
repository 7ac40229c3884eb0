//! Rotor: one permutation disc with a rotational offset.
//!
//! A rotor wraps a [`Permutation`] and a current setting, and converts
//! signals with offset correction: the wiring is fixed relative to the
//! rotor body while the body is rotated to `setting` relative to the
//! machine frame. Variants differ only in capability: reflectors turn the
//! signal around, fixed rotors sit still, moving rotors carry notches and
//! advance under machine control.
//!
//! Rotors never own their neighbors. The rotor physically to the right is
//! recorded as a slot index into the machine's rotor bank, assigned when
//! the bank is assembled and used only for notch sensing.

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;

/// Capability tag distinguishing the rotor variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Turns the forward signal back through the chain. Never moves and
    /// its wiring must be a derangement.
    Reflector,
    /// Participates in the conversion chain but never advances.
    Fixed,
    /// Advances under machine control; `notches` are the settings at
    /// which it signals the rotor to its left.
    Moving { notches: Vec<usize> },
}

/// A named rotor: a [`Permutation`] plus a rotational offset ("setting"),
/// a capability tag, and the machine-assigned chain bookkeeping.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
    right: Option<usize>,
    leftmost_rotating: bool,
}

impl Rotor {
    /// Creates a reflecting rotor.
    ///
    /// # Errors
    /// Returns [`EnigmaError::ReflectorNotDerangement`] if `perm` maps any
    /// index to itself — a reflector with a fixed point would bounce a
    /// signal straight back into the contact it came from.
    pub fn reflector(name: &str, perm: Permutation) -> Result<Self, EnigmaError> {
        if !perm.derangement() {
            return Err(EnigmaError::ReflectorNotDerangement(name.to_string()));
        }
        Ok(Self::build(name, perm, RotorKind::Reflector))
    }

    /// Creates a stationary, non-reflecting rotor.
    pub fn fixed(name: &str, perm: Permutation) -> Self {
        Self::build(name, perm, RotorKind::Fixed)
    }

    /// Creates a rotating rotor whose notches sit at the positions named
    /// by the symbols of `notches`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidNotch`] if a notch symbol is not in
    /// the rotor's alphabet.
    pub fn moving(name: &str, perm: Permutation, notches: &str) -> Result<Self, EnigmaError> {
        let mut positions = Vec::with_capacity(notches.chars().count());
        for ch in notches.chars() {
            let index = perm.alphabet().index(ch).map_err(|_| EnigmaError::InvalidNotch {
                name: name.to_string(),
                notch: ch,
            })?;
            positions.push(index);
        }
        Ok(Self::build(name, perm, RotorKind::Moving { notches: positions }))
    }

    fn build(name: &str, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name: name.to_string(),
            permutation,
            kind,
            setting: 0,
            right: None,
            leftmost_rotating: false,
        }
    }

    /// Returns the rotor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rotor's alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        self.permutation.alphabet()
    }

    /// Returns the rotor's permutation at its zero position.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns the size of the rotor's alphabet.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Returns true iff this rotor has a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns true iff this rotor reflects.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns the current setting.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Sets the rotor to position `posn`, wrapped into range.
    ///
    /// # Errors
    /// Returns [`EnigmaError::ReflectorSetting`] if this rotor reflects
    /// and `posn` does not wrap to zero: reflectors have no exposed
    /// rotatable ring.
    pub fn set(&mut self, posn: i64) -> Result<(), EnigmaError> {
        let wrapped = self.permutation.wrap(posn);
        if self.reflecting() && wrapped != 0 {
            return Err(EnigmaError::ReflectorSetting(self.name.clone()));
        }
        self.setting = wrapped;
        Ok(())
    }

    /// Sets the rotor to the position named by symbol `posn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidSymbol`] if `posn` is not in the
    /// alphabet, or [`EnigmaError::ReflectorSetting`] as for
    /// [`set`](Self::set).
    pub fn set_symbol(&mut self, posn: char) -> Result<(), EnigmaError> {
        let index = self.permutation.alphabet().index(posn)?;
        self.set(index as i64)
    }

    /// Converts an entering signal at contact `p`, right to left.
    ///
    /// The signal enters offset by the setting, passes the wiring, and is
    /// corrected back into the machine frame:
    /// `wrap(permute(p + setting) - setting)`.
    pub fn convert_forward(&self, p: usize) -> usize {
        let contact = self.permutation.wrap(p as i64 + self.setting as i64);
        let permuted = self.permutation.permute(contact);
        self.permutation.wrap(permuted as i64 - self.setting as i64)
    }

    /// Converts a returning signal at contact `e`, left to right, through
    /// the inverse wiring with the same offset correction.
    pub fn convert_backward(&self, e: usize) -> usize {
        let contact = self.permutation.wrap(e as i64 + self.setting as i64);
        let inverted = self.permutation.invert(contact);
        self.permutation.wrap(inverted as i64 - self.setting as i64)
    }

    /// Returns true iff the rotor currently sits at one of its notches,
    /// allowing the rotor to its left to advance. Always false for
    /// non-rotating variants.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&self.setting),
            _ => false,
        }
    }

    /// Advances the rotor one position, wrapping at the alphabet size.
    /// A no-op on non-rotating variants.
    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    /// Returns the slot index of the rotor physically to this one's right,
    /// if any. The rightmost rotor in a machine has none.
    pub fn right_neighbor(&self) -> Option<usize> {
        self.right
    }

    /// Records the slot index of the right-hand neighbor. Assigned by the
    /// machine whenever the rotor bank is rebuilt.
    pub(crate) fn set_right_neighbor(&mut self, slot: Option<usize>) {
        self.right = slot;
    }

    /// Returns true iff the machine marked this rotor as the leftmost of
    /// its rotating rotors.
    pub fn is_leftmost_rotating(&self) -> bool {
        self.leftmost_rotating
    }

    /// Marks or clears the leftmost-rotating flag. Assigned by the machine
    /// when settings are applied.
    pub(crate) fn set_leftmost_rotating(&mut self, flag: bool) {
        self.leftmost_rotating = flag;
    }

    /// Returns the rotor to its slot-zero state: setting 0, no neighbor,
    /// flag cleared. Applied when a catalog template is cloned into a
    /// machine slot, so per-use state never leaks between setups.
    pub(crate) fn reset(&mut self) {
        self.setting = 0;
        self.right = None;
        self.leftmost_rotating = false;
    }
}
