//! Machine: the complete rotor cipher machine.
//!
//! Owns an ordered bank of rotor slots (slot 0 is the reflector, the
//! rightmost slot the fastest rotor) plus the plugboard permutation, and
//! drives the per-symbol conversion cycle: stepping decision, plugboard,
//! forward pass through the bank to the reflector, backward pass out, and
//! the plugboard again in inverse.
//!
//! Stepping is two-phase. All eligible slots decide from the same
//! pre-step snapshot whether they will move, and only then are the
//! advances applied. Deciding and advancing slot by slot would let an
//! already-applied advance corrupt a later slot's notch reading and
//! miscount multi-rotor carries.

use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// A complete rotor cipher machine.
///
/// Built from an alphabet, a slot geometry (total slots and pawl-driven
/// slots), and a catalog of named rotors available for insertion. The
/// active rotor bank and plugboard are replaced wholesale on each setup;
/// rotor settings mutate on every converted symbol.
///
/// # Examples
///
/// ```
/// use enigma::{Alphabet, Machine, Permutation, Rotor};
/// use std::collections::HashMap;
///
/// let alpha = Alphabet::new("ABCD").unwrap();
/// let mut catalog = HashMap::new();
/// catalog.insert(
///     "REF".to_string(),
///     Rotor::reflector("REF", Permutation::new("(AC) (BD)", alpha.clone()).unwrap()).unwrap(),
/// );
/// catalog.insert(
///     "FAST".to_string(),
///     Rotor::moving("FAST", Permutation::new("(ABCD)", alpha.clone()).unwrap(), "D").unwrap(),
/// );
///
/// let mut machine = Machine::new(alpha, 2, 1, catalog).unwrap();
/// machine.insert_rotors(&["REF", "FAST"]).unwrap();
/// machine.set_rotors("A").unwrap();
/// assert_eq!(machine.convert_text("AB").unwrap(), "CD");
/// ```
pub struct Machine {
    alphabet: Alphabet,
    num_rotors: usize,
    num_pawls: usize,
    catalog: HashMap<String, Rotor>,
    slots: Vec<Rotor>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots, of which the rightmost
    /// `num_pawls` are pawl-driven, drawing rotors from `catalog`.
    ///
    /// The catalog entries are read-only templates: inserting a rotor
    /// clones it into a slot, so successive setups reusing a catalog
    /// entry never see each other's settings.
    ///
    /// # Errors
    /// Returns [`EnigmaError::BadGeometry`] unless `num_rotors > 1` and
    /// `num_pawls < num_rotors`.
    pub fn new(
        alphabet: Alphabet,
        num_rotors: usize,
        num_pawls: usize,
        catalog: HashMap<String, Rotor>,
    ) -> Result<Self, EnigmaError> {
        if num_rotors < 2 || num_pawls >= num_rotors {
            return Err(EnigmaError::BadGeometry {
                rotors: num_rotors,
                pawls: num_pawls,
            });
        }
        let plugboard = Permutation::identity(alphabet.clone());
        Ok(Machine {
            alphabet,
            num_rotors,
            num_pawls,
            catalog,
            slots: Vec::new(),
            plugboard,
        })
    }

    /// Returns the machine's alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls, and thus the maximum number of
    /// rotating rotors.
    pub fn num_pawls(&self) -> usize {
        self.num_pawls
    }

    /// Returns true iff a rotor named `name` is available in the catalog.
    pub fn has_rotor(&self, name: &str) -> bool {
        self.catalog.contains_key(name)
    }

    /// Returns the currently inserted rotor bank, leftmost (reflector)
    /// first. Empty until [`insert_rotors`](Self::insert_rotors) runs.
    pub fn slots(&self) -> &[Rotor] {
        &self.slots
    }

    /// Fills the rotor bank with the catalog rotors named in `names`,
    /// leftmost first; `names[0]` is the reflector. Every slot receives a
    /// fresh clone at setting 0, and right-neighbor links are rebuilt
    /// (the rightmost slot senses nothing to its right).
    ///
    /// All validation happens before any mutation: on error the previous
    /// bank, if any, stays active.
    ///
    /// # Errors
    /// - [`EnigmaError::WrongRotorCount`] unless exactly
    ///   [`num_rotors`](Self::num_rotors) names are given.
    /// - [`EnigmaError::UnknownRotor`] if a name is not in the catalog.
    /// - [`EnigmaError::BadArrangement`] unless slot 0 (and only slot 0)
    ///   reflects and the rotating rotors form a contiguous suffix of at
    ///   most [`num_pawls`](Self::num_pawls) slots.
    pub fn insert_rotors(&mut self, names: &[&str]) -> Result<(), EnigmaError> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::WrongRotorCount {
                expected: self.num_rotors,
                given: names.len(),
            });
        }
        let mut bank = Vec::with_capacity(names.len());
        for &name in names {
            let rotor = self
                .catalog
                .get(name)
                .ok_or_else(|| EnigmaError::UnknownRotor(name.to_string()))?;
            let mut rotor = rotor.clone();
            rotor.reset();
            bank.push(rotor);
        }

        if !bank[0].reflecting() {
            return Err(EnigmaError::BadArrangement(format!(
                "slot 0 must hold a reflector, '{}' does not reflect",
                bank[0].name()
            )));
        }
        for rotor in &bank[1..] {
            if rotor.reflecting() {
                return Err(EnigmaError::BadArrangement(format!(
                    "reflector '{}' outside slot 0",
                    rotor.name()
                )));
            }
        }
        if let Some(first_rotating) = bank.iter().position(Rotor::rotates) {
            if let Some(still) = bank[first_rotating..].iter().find(|r| !r.rotates()) {
                return Err(EnigmaError::BadArrangement(format!(
                    "stationary rotor '{}' right of a rotating one",
                    still.name()
                )));
            }
            let rotating = bank.len() - first_rotating;
            if rotating > self.num_pawls {
                return Err(EnigmaError::BadArrangement(format!(
                    "{} rotating rotors inserted but only {} pawls",
                    rotating, self.num_pawls
                )));
            }
        }

        let last = bank.len() - 1;
        for (i, rotor) in bank.iter_mut().enumerate() {
            rotor.set_right_neighbor(if i < last { Some(i + 1) } else { None });
        }
        self.slots = bank;
        Ok(())
    }

    /// Applies initial settings to every non-reflector slot from a symbol
    /// sequence of length `num_rotors() - 1`, leftmost first, and marks
    /// the leftmost pawl-driven slot for the double-step rule.
    ///
    /// Settings are validated in full before any slot is touched.
    ///
    /// # Errors
    /// - [`EnigmaError::IncompleteSettings`] if the sequence length is not
    ///   exactly `num_rotors() - 1`.
    /// - [`EnigmaError::InvalidSymbol`] if a setting symbol is not in the
    ///   alphabet.
    ///
    /// # Panics
    /// Panics if no rotor bank has been inserted.
    pub fn set_rotors(&mut self, setting: &str) -> Result<(), EnigmaError> {
        assert_eq!(
            self.slots.len(),
            self.num_rotors,
            "rotors must be inserted before settings are applied"
        );
        let needed = self.num_rotors - 1;
        let positions: Vec<char> = setting.chars().collect();
        if positions.len() != needed {
            return Err(EnigmaError::IncompleteSettings {
                needed,
                given: positions.len(),
            });
        }
        let mut indices = Vec::with_capacity(needed);
        for &ch in &positions {
            indices.push(self.alphabet.index(ch)?);
        }

        for (slot, index) in self.slots[1..].iter_mut().zip(indices) {
            slot.set(index as i64)?;
            slot.set_leftmost_rotating(false);
        }
        if self.num_pawls > 0 {
            let leftmost = self.num_rotors - self.num_pawls;
            self.slots[leftmost].set_leftmost_rotating(true);
        }
        Ok(())
    }

    /// Replaces the active plugboard permutation wholesale.
    pub fn set_plugboard(&mut self, plugboard: Permutation) {
        self.plugboard = plugboard;
    }

    /// Converts one symbol index, advancing the machine first.
    ///
    /// # Panics
    /// Panics if `c` is out of range for the alphabet or if no rotor bank
    /// has been inserted — both are caller bugs, not input errors; symbol
    /// validation belongs to the caller (see
    /// [`convert_text`](Self::convert_text)).
    pub fn convert(&mut self, c: usize) -> usize {
        assert_eq!(
            self.slots.len(),
            self.num_rotors,
            "rotors must be inserted before conversion"
        );
        assert!(c < self.alphabet.size(), "index {} out of range", c);

        self.step();

        let mut signal = self.plugboard.permute(c);
        for slot in self.slots.iter().rev() {
            signal = slot.convert_forward(signal);
        }
        for slot in self.slots[1..].iter() {
            signal = slot.convert_backward(signal);
        }
        self.plugboard.invert(signal)
    }

    /// Converts a symbol sequence in order, preserving order.
    ///
    /// Every character must belong to the alphabet; whitespace and other
    /// foreign characters are the caller's concern and are rejected here.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidSymbol`] on the first character
    /// outside the alphabet. Rotor state advanced by the already-converted
    /// prefix is not rolled back.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Machine, Permutation, Rotor};
    /// use std::collections::HashMap;
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// let mut catalog = HashMap::new();
    /// catalog.insert(
    ///     "REF".to_string(),
    ///     Rotor::reflector("REF", Permutation::new("(AC) (BD)", alpha.clone()).unwrap()).unwrap(),
    /// );
    /// catalog.insert(
    ///     "FAST".to_string(),
    ///     Rotor::moving("FAST", Permutation::new("(ABCD)", alpha.clone()).unwrap(), "D").unwrap(),
    /// );
    /// let mut machine = Machine::new(alpha, 2, 1, catalog).unwrap();
    /// machine.insert_rotors(&["REF", "FAST"]).unwrap();
    /// machine.set_rotors("A").unwrap();
    /// assert!(machine.convert_text("A B").is_err());
    /// ```
    pub fn convert_text(&mut self, msg: &str) -> Result<String, EnigmaError> {
        let mut converted = String::with_capacity(msg.len());
        for ch in msg.chars() {
            let index = self.alphabet.index(ch)?;
            let converted_index = self.convert(index);
            converted.push(self.alphabet.symbol(converted_index));
        }
        Ok(converted)
    }

    /// Advances the rotor bank one keystroke.
    ///
    /// Phase one decides, for each pawl-driven slot and from pre-step
    /// state only: the rightmost slot always steps; a slot whose right
    /// neighbor sits at a notch steps; a slot at its own notch steps
    /// unless it is the leftmost rotating slot. Phase two applies the
    /// recorded decisions.
    fn step(&mut self) {
        let first_pawl = self.num_rotors - self.num_pawls;
        let mut will_step = vec![false; self.num_rotors];
        for i in first_pawl..self.num_rotors {
            let slot = &self.slots[i];
            will_step[i] = match slot.right_neighbor() {
                None => true,
                Some(right) => {
                    self.slots[right].at_notch()
                        || (slot.at_notch() && !slot.is_leftmost_rotating())
                }
            };
        }
        for (slot, &step) in self.slots.iter_mut().zip(&will_step) {
            if step {
                slot.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFLECTOR_B: &str = "(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)";
    const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const ROTOR_II: &str = "(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT)";
    const ROTOR_III: &str = "(ABDHPEJT) (CFLVMZOYQIRWUKXSG)";
    const BETA: &str = "(ALBEVFCYODJWUGNMQTZSKPR) (HIX)";

    fn catalog() -> HashMap<String, Rotor> {
        let alpha = Alphabet::default();
        let perm = |cycles: &str| Permutation::new(cycles, alpha.clone()).unwrap();
        let mut catalog = HashMap::new();
        catalog.insert(
            "B".to_string(),
            Rotor::reflector("B", perm(REFLECTOR_B)).unwrap(),
        );
        catalog.insert("BETA".to_string(), Rotor::fixed("BETA", perm(BETA)));
        catalog.insert(
            "I".to_string(),
            Rotor::moving("I", perm(ROTOR_I), "Q").unwrap(),
        );
        catalog.insert(
            "II".to_string(),
            Rotor::moving("II", perm(ROTOR_II), "E").unwrap(),
        );
        catalog.insert(
            "III".to_string(),
            Rotor::moving("III", perm(ROTOR_III), "V").unwrap(),
        );
        catalog
    }

    fn machine(rotors: usize, pawls: usize) -> Machine {
        Machine::new(Alphabet::default(), rotors, pawls, catalog()).unwrap()
    }

    fn settings(machine: &Machine) -> Vec<usize> {
        machine.slots().iter().map(Rotor::setting).collect()
    }

    #[test]
    fn test_geometry_validation() {
        assert!(matches!(
            Machine::new(Alphabet::default(), 1, 0, catalog()),
            Err(EnigmaError::BadGeometry { .. })
        ));
        assert!(matches!(
            Machine::new(Alphabet::default(), 3, 3, catalog()),
            Err(EnigmaError::BadGeometry { .. })
        ));
        assert!(Machine::new(Alphabet::default(), 4, 3, catalog()).is_ok());
    }

    #[test]
    fn test_insert_wrong_count() {
        let mut m = machine(4, 3);
        assert_eq!(
            m.insert_rotors(&["B", "I", "II"]),
            Err(EnigmaError::WrongRotorCount {
                expected: 4,
                given: 3
            })
        );
    }

    #[test]
    fn test_insert_unknown_rotor_leaves_machine_unmodified() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors("AAA").unwrap();
        assert_eq!(
            m.insert_rotors(&["B", "I", "II", "VIII"]),
            Err(EnigmaError::UnknownRotor("VIII".to_string()))
        );
        // prior bank still active and convertible
        assert_eq!(m.slots().len(), 4);
        m.convert(0);
    }

    #[test]
    fn test_insert_requires_reflector_in_slot_zero() {
        let mut m = machine(4, 3);
        assert!(matches!(
            m.insert_rotors(&["BETA", "I", "II", "III"]),
            Err(EnigmaError::BadArrangement(_))
        ));
        let mut m = machine(4, 2);
        assert!(matches!(
            m.insert_rotors(&["B", "I", "B", "III"]),
            Err(EnigmaError::BadArrangement(_))
        ));
    }

    #[test]
    fn test_insert_rejects_stationary_right_of_rotating() {
        let mut m = machine(4, 3);
        assert!(matches!(
            m.insert_rotors(&["B", "I", "BETA", "III"]),
            Err(EnigmaError::BadArrangement(_))
        ));
    }

    #[test]
    fn test_insert_rejects_more_rotating_than_pawls() {
        let mut m = machine(4, 2);
        assert!(matches!(
            m.insert_rotors(&["B", "I", "II", "III"]),
            Err(EnigmaError::BadArrangement(_))
        ));
    }

    #[test]
    fn test_set_rotors_length_must_match() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        assert_eq!(
            m.set_rotors("AA"),
            Err(EnigmaError::IncompleteSettings {
                needed: 3,
                given: 2
            })
        );
        assert_eq!(
            m.set_rotors("AAAA"),
            Err(EnigmaError::IncompleteSettings {
                needed: 3,
                given: 4
            })
        );
    }

    #[test]
    fn test_set_rotors_rejects_foreign_symbol() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        assert_eq!(m.set_rotors("A9A"), Err(EnigmaError::InvalidSymbol('9')));
    }

    #[test]
    fn test_set_rotors_marks_leftmost_rotating() {
        let mut m = machine(5, 3);
        m.insert_rotors(&["B", "BETA", "I", "II", "III"]).unwrap();
        m.set_rotors("AAAA").unwrap();
        let flags: Vec<bool> = m.slots().iter().map(Rotor::is_leftmost_rotating).collect();
        assert_eq!(flags, vec![false, false, true, false, false]);
    }

    #[test]
    fn test_rightmost_always_steps() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors("AAA").unwrap();
        for k in 1..=3 {
            m.convert(0);
            assert_eq!(settings(&m), vec![0, 0, 0, k]);
        }
    }

    #[test]
    fn test_single_step_carry_at_notch() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        // III notches at V; one keystroke later it carries into II.
        m.set_rotors("AAV").unwrap();
        m.convert(0);
        assert_eq!(settings(&m), vec![0, 0, 1, 22]);
    }

    #[test]
    fn test_double_step() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        // II sits at its own notch E: the same keystroke advances III
        // (always), II (self-kick), and I (carry from II).
        m.set_rotors("AEA").unwrap();
        m.convert(0);
        assert_eq!(settings(&m), vec![0, 1, 5, 1]);
        // Next keystroke: II has left its notch, only III moves.
        m.convert(0);
        assert_eq!(settings(&m), vec![0, 1, 5, 2]);
    }

    #[test]
    fn test_leftmost_rotating_does_not_self_kick() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        // I (the leftmost rotating slot) at its notch Q must stay put:
        // its own notch only matters to a pawl further left, and there
        // is none.
        m.set_rotors("QAA").unwrap();
        m.convert(0);
        assert_eq!(settings(&m), vec![0, 16, 0, 1]);
    }

    #[test]
    fn test_plugboard_wraps_the_signal_path() {
        let mut plain = machine(4, 3);
        plain.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        plain.set_rotors("AAA").unwrap();
        let first_plain = plain.convert_text("A").unwrap();

        let mut plugged = machine(4, 3);
        plugged.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        plugged.set_rotors("AAA").unwrap();
        plugged.set_plugboard(Permutation::new("(AQ)", Alphabet::default()).unwrap());
        // A enters as Q, so the plugged machine must disagree with the
        // plain one on the very first symbol.
        let first_plugged = plugged.convert_text("A").unwrap();
        assert_ne!(first_plain, first_plugged);
    }

    #[test]
    fn test_fresh_clone_per_setup() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors("AAA").unwrap();
        for _ in 0..30 {
            m.convert(0);
        }
        // Re-inserting the same names must restore zero settings.
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        assert_eq!(settings(&m), vec![0, 0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_convert_out_of_range_panics() {
        let mut m = machine(4, 3);
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors("AAA").unwrap();
        m.convert(26);
    }

    #[test]
    #[should_panic]
    fn test_convert_without_rotors_panics() {
        let mut m = machine(4, 3);
        m.convert(0);
    }
}
