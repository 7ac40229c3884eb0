//! Permutation: a bijective self-map of alphabet indices in cycle notation.
//!
//! A permutation is described the way the physical wiring tables are:
//! as disjoint cycles of symbols, `"(AELTPHQXRU) (IV)"`. Symbols absent
//! from every cycle are fixed points. Forward and inverse index tables are
//! precomputed from the cycles, so application is a single array lookup.

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// A permutation of the indices `0..size` of an [`Alphabet`], built from
/// disjoint cycles.
///
/// Supports forward and inverse application in both index and symbol form,
/// and wholesale replacement of the cycle set (used when a plugboard or
/// rotor wiring is amended — replacement never merges with prior state).
#[derive(Debug, Clone)]
pub struct Permutation {
    alphabet: Alphabet,
    cycles: Vec<Vec<usize>>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Creates the permutation described by `cycles` over `alphabet`.
    ///
    /// `cycles` is a string of the form `"(cccc) (cc) ..."` where the c's
    /// are alphabet symbols; whitespace between groups is ignored. The
    /// empty string is the identity permutation.
    ///
    /// # Errors
    /// Returns [`EnigmaError::MalformedCycles`] on unbalanced or nested
    /// parentheses, an empty group, a symbol outside any group, or a
    /// symbol repeated across the specification, and
    /// [`EnigmaError::InvalidSymbol`] for symbols not in the alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// let perm = Permutation::new("(BACD)", alpha).unwrap();
    /// assert_eq!(perm.permute(1), 0);
    /// assert_eq!(perm.invert(0), 1);
    /// ```
    pub fn new(cycles: &str, alphabet: Alphabet) -> Result<Self, EnigmaError> {
        let parsed = Self::parse_cycles(cycles, &alphabet)?;
        let (forward, inverse) = Self::build_tables(&parsed, alphabet.size());
        Ok(Permutation {
            alphabet,
            cycles: parsed,
            forward,
            inverse,
        })
    }

    /// The identity permutation over `alphabet`.
    pub fn identity(alphabet: Alphabet) -> Self {
        let size = alphabet.size();
        Permutation {
            alphabet,
            cycles: Vec::new(),
            forward: (0..size).collect(),
            inverse: (0..size).collect(),
        }
    }

    /// Returns the size of the alphabet this permutation acts on.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns the alphabet this permutation acts on.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Reduces any integer to `0..size` using floored modulo.
    ///
    /// The result is always non-negative, so offset arithmetic that dips
    /// below zero (a rotor subtracting its setting) lands back in range.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let perm = Permutation::identity(Alphabet::new("ABCD").unwrap());
    /// assert_eq!(perm.wrap(-1), 3);
    /// assert_eq!(perm.wrap(5), 1);
    /// ```
    pub fn wrap(&self, p: i64) -> usize {
        p.rem_euclid(self.size() as i64) as usize
    }

    /// Applies the permutation to index `p` (taken modulo the size).
    pub fn permute(&self, p: usize) -> usize {
        self.forward[p % self.size()]
    }

    /// Applies the inverse permutation to index `c` (taken modulo the size).
    pub fn invert(&self, c: usize) -> usize {
        self.inverse[c % self.size()]
    }

    /// Applies the permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidSymbol`] if `p` is not in the alphabet.
    pub fn permute_symbol(&self, p: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.index(p)?;
        Ok(self.alphabet.symbol(self.permute(index)))
    }

    /// Applies the inverse permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidSymbol`] if `c` is not in the alphabet.
    pub fn invert_symbol(&self, c: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.index(c)?;
        Ok(self.alphabet.symbol(self.invert(index)))
    }

    /// Returns true iff this permutation is a derangement, i.e. no index
    /// maps to itself. This requires every alphabet symbol to appear in
    /// some cycle of length at least 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let abcd = Alphabet::new("ABCD").unwrap();
    /// assert!(Permutation::new("(BACD)", abcd).unwrap().derangement());
    ///
    /// let partial = Alphabet::new("HILFNGR").unwrap();
    /// assert!(!Permutation::new("(HIG)(NF) (L)", partial).unwrap().derangement());
    /// ```
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &t)| i != t)
    }

    /// Atomically replaces the cycle set with the one described by
    /// `cycles`, rebuilding the derived tables.
    ///
    /// This is a full replacement, never a merge: the previous cycles and
    /// anything derived from them are discarded. On error the permutation
    /// is left unchanged.
    ///
    /// # Errors
    /// Same conditions as [`new`](Self::new).
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let mut perm = Permutation::new("(AB)", Alphabet::new("ABCD").unwrap()).unwrap();
    /// perm.replace_cycles("(CD)").unwrap();
    /// assert_eq!(perm.permute(0), 0); // the old (AB) swap is gone
    /// assert_eq!(perm.permute(2), 3);
    /// ```
    pub fn replace_cycles(&mut self, cycles: &str) -> Result<(), EnigmaError> {
        let parsed = Self::parse_cycles(cycles, &self.alphabet)?;
        let (forward, inverse) = Self::build_tables(&parsed, self.size());
        self.cycles = parsed;
        self.forward = forward;
        self.inverse = inverse;
        Ok(())
    }

    /// Renders the current cycle set back into specification form,
    /// e.g. `"(AB) (CD)"`. Useful when an existing wiring is amended:
    /// append further groups to this string and pass the result to
    /// [`replace_cycles`](Self::replace_cycles).
    pub fn cycle_string(&self) -> String {
        self.cycles
            .iter()
            .map(|cycle| {
                let symbols: String = cycle.iter().map(|&i| self.alphabet.symbol(i)).collect();
                format!("({})", symbols)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses a cycle string into disjoint index groups.
    fn parse_cycles(spec: &str, alphabet: &Alphabet) -> Result<Vec<Vec<usize>>, EnigmaError> {
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        let mut current: Option<Vec<usize>> = None;
        let mut seen = vec![false; alphabet.size()];

        for ch in spec.chars() {
            match ch {
                '(' => {
                    if current.is_some() {
                        return Err(EnigmaError::MalformedCycles(
                            "'(' inside an open group".to_string(),
                        ));
                    }
                    current = Some(Vec::new());
                }
                ')' => match current.take() {
                    Some(cycle) if cycle.is_empty() => {
                        return Err(EnigmaError::MalformedCycles("empty group".to_string()));
                    }
                    Some(cycle) => cycles.push(cycle),
                    None => {
                        return Err(EnigmaError::MalformedCycles(
                            "')' without matching '('".to_string(),
                        ));
                    }
                },
                ch if ch.is_whitespace() && current.is_none() => {}
                ch => match current.as_mut() {
                    Some(cycle) => {
                        let index = alphabet.index(ch)?;
                        if seen[index] {
                            return Err(EnigmaError::MalformedCycles(format!(
                                "symbol '{}' appears in more than one position",
                                ch
                            )));
                        }
                        seen[index] = true;
                        cycle.push(index);
                    }
                    None => {
                        return Err(EnigmaError::MalformedCycles(format!(
                            "symbol '{}' outside any group",
                            ch
                        )));
                    }
                },
            }
        }
        if current.is_some() {
            return Err(EnigmaError::MalformedCycles(
                "unclosed group at end of specification".to_string(),
            ));
        }
        Ok(cycles)
    }

    /// Builds the forward and inverse index tables from parsed cycles.
    ///
    /// Indices not covered by any cycle stay on the identity diagonal.
    fn build_tables(cycles: &[Vec<usize>], size: usize) -> (Vec<usize>, Vec<usize>) {
        let mut forward: Vec<usize> = (0..size).collect();
        for cycle in cycles {
            for (i, &from) in cycle.iter().enumerate() {
                forward[from] = cycle[(i + 1) % cycle.len()];
            }
        }
        let mut inverse = vec![0usize; size];
        for (from, &to) in forward.iter().enumerate() {
            inverse[to] = from;
        }
        (forward, inverse)
    }
}
