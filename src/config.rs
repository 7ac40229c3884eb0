//! Text configuration front end.
//!
//! Builds machines from a textual configuration description, applies
//! setup directives, and formats converted messages for display. Works
//! entirely on strings: opening files, command lines and stream plumbing
//! stay with the embedding application.
//!
//! A configuration description looks like:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//! I   MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! II  ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT)
//! III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG)
//! BETA N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B   R (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)
//! ```
//!
//! Line 1 is the alphabet, line 2 the slot and pawl counts. Each further
//! line describes one rotor: a name, a type tag (`R` reflector, `N`
//! stationary, `M` rotating with its notch symbols appended), and the
//! wiring cycles. A line beginning with `(` continues the cycles of the
//! rotor above it.
//!
//! A setup directive selects and positions rotors for a message batch:
//!
//! ```text
//! * B BETA I II III AAAA (AQ) (EP)
//! ```

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

use std::collections::HashMap;

/// Width of the display groups produced by [`group_message`].
const GROUP_WIDTH: usize = 5;

/// Parses a configuration description into a ready-to-set-up [`Machine`].
///
/// # Errors
/// Returns [`EnigmaError::BadConfig`] for structural problems (missing
/// lines, non-numeric counts, unknown rotor type tags, duplicate rotor
/// names, a continuation line with no rotor above it), and passes through
/// the construction errors of the components (bad alphabet, malformed
/// cycles, non-derangement reflector wiring, invalid notch symbols,
/// unsupported slot geometry).
pub fn parse_config(text: &str) -> Result<Machine, EnigmaError> {
    let mut lines = text.lines();

    let alphabet_line = lines
        .next()
        .ok_or_else(|| EnigmaError::BadConfig("missing alphabet line".to_string()))?
        .trim();
    if alphabet_line
        .chars()
        .any(|ch| ch == '(' || ch == ')' || ch == '*' || ch.is_whitespace())
    {
        return Err(EnigmaError::BadConfig(
            "alphabet may not contain '(', ')', '*' or whitespace".to_string(),
        ));
    }
    let alphabet = Alphabet::new(alphabet_line)?;

    let counts_line = lines
        .next()
        .ok_or_else(|| EnigmaError::BadConfig("missing slot/pawl count line".to_string()))?;
    let mut counts = counts_line.split_whitespace();
    let num_rotors = parse_count(counts.next(), "rotor slot count")?;
    let num_pawls = parse_count(counts.next(), "pawl count")?;
    if counts.next().is_some() {
        return Err(EnigmaError::BadConfig(format!(
            "trailing tokens after counts in '{}'",
            counts_line.trim()
        )));
    }

    // Rotor descriptions. Cycles are accumulated per rotor first so that
    // continuation lines are folded in before any wiring is built.
    struct Description {
        name: String,
        tag: String,
        cycles: String,
    }
    let mut descriptions: Vec<Description> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('(') {
            match descriptions.last_mut() {
                Some(last) => {
                    last.cycles.push(' ');
                    last.cycles.push_str(line);
                }
                None => {
                    return Err(EnigmaError::BadConfig(
                        "cycle continuation before any rotor description".to_string(),
                    ));
                }
            }
            continue;
        }
        let mut tokens = line.split_whitespace();
        let name = tokens.next().expect("non-empty line has a first token");
        let tag = tokens.next().ok_or_else(|| {
            EnigmaError::BadConfig(format!("rotor '{}' is missing its type tag", name))
        })?;
        let cycles = tokens.collect::<Vec<_>>().join(" ");
        if descriptions.iter().any(|d| d.name == name) {
            return Err(EnigmaError::BadConfig(format!(
                "rotor '{}' described twice",
                name
            )));
        }
        descriptions.push(Description {
            name: name.to_string(),
            tag: tag.to_string(),
            cycles,
        });
    }

    let mut catalog = HashMap::new();
    for desc in descriptions {
        let perm = Permutation::new(&desc.cycles, alphabet.clone())?;
        let rotor = match desc.tag.chars().next() {
            Some('R') if desc.tag.len() == 1 => Rotor::reflector(&desc.name, perm)?,
            Some('N') if desc.tag.len() == 1 => Rotor::fixed(&desc.name, perm),
            Some('M') => Rotor::moving(&desc.name, perm, &desc.tag[1..])?,
            _ => {
                return Err(EnigmaError::BadConfig(format!(
                    "rotor '{}' has undefined type tag '{}'",
                    desc.name, desc.tag
                )));
            }
        };
        catalog.insert(desc.name, rotor);
    }

    Machine::new(alphabet, num_rotors, num_pawls, catalog)
}

fn parse_count(token: Option<&str>, what: &str) -> Result<usize, EnigmaError> {
    let token = token.ok_or_else(|| EnigmaError::BadConfig(format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| EnigmaError::BadConfig(format!("{} '{}' is not a number", what, token)))
}

/// Applies a setup directive `* NAME... SETTING [cycles]` to `machine`:
/// rotor names leftmost first (the first names the reflector), an initial
/// setting symbol per non-reflector slot, and an optional plugboard cycle
/// specification. The plugboard is replaced even when the directive gives
/// no cycles — a directive without them clears any previous plugboard.
///
/// # Errors
/// Returns [`EnigmaError::BadDirective`] if the line does not start with
/// `*` or is too short to name rotors and a setting, and passes through
/// [`EnigmaError::UnknownRotor`], [`EnigmaError::WrongRotorCount`],
/// [`EnigmaError::BadArrangement`], [`EnigmaError::IncompleteSettings`],
/// [`EnigmaError::InvalidSymbol`] and [`EnigmaError::MalformedCycles`]
/// from the machine and plugboard construction.
pub fn apply_setup(machine: &mut Machine, directive: &str) -> Result<(), EnigmaError> {
    let trimmed = directive.trim();
    let rest = trimmed.strip_prefix('*').ok_or_else(|| {
        EnigmaError::BadDirective("setup directive must start with '*'".to_string())
    })?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let plug_start = tokens.iter().position(|t| t.starts_with('('));
    let (names, setting, plug_cycles) = match plug_start {
        Some(i) if i >= 2 => (&tokens[..i - 1], tokens[i - 1], tokens[i..].join(" ")),
        Some(_) => {
            return Err(EnigmaError::BadDirective(
                "plugboard cycles precede the rotor names".to_string(),
            ));
        }
        None if tokens.len() >= 2 => (
            &tokens[..tokens.len() - 1],
            tokens[tokens.len() - 1],
            String::new(),
        ),
        None => {
            return Err(EnigmaError::BadDirective(
                "directive names no rotors or gives no setting".to_string(),
            ));
        }
    };

    for name in names {
        if !machine.has_rotor(name) {
            return Err(EnigmaError::UnknownRotor(name.to_string()));
        }
    }
    machine.insert_rotors(names)?;
    machine.set_rotors(setting)?;
    machine.set_plugboard(Permutation::new(&plug_cycles, machine.alphabet().clone())?);
    Ok(())
}

/// Formats a converted message in groups of five symbols separated by
/// single spaces; the last group may be shorter.
pub fn group_message(msg: &str) -> String {
    msg.chars()
        .collect::<Vec<_>>()
        .chunks(GROUP_WIDTH)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A line-oriented conversion session over one machine.
///
/// The first input line must be a setup directive; later `*` lines
/// reconfigure the machine between message batches. Blank lines pass
/// through as blank output. Message lines are stripped of whitespace,
/// converted symbol by symbol, and grouped for display.
///
/// # Examples
///
/// ```
/// use enigma::config::Session;
///
/// let config = "\
/// ABCDEFGHIJKLMNOPQRSTUVWXYZ
/// 4 3
/// I   MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
/// II  ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT)
/// III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG)
/// B   R (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)
/// ";
/// let mut session = Session::new(config).unwrap();
/// let output = session.process("* B I II III AAA\nAAAAA").unwrap();
/// assert_eq!(output, vec!["BDZGO".to_string()]);
/// ```
pub struct Session {
    machine: Machine,
    configured: bool,
}

impl Session {
    /// Creates a session around the machine described by `config`.
    ///
    /// # Errors
    /// Same conditions as [`parse_config`].
    pub fn new(config: &str) -> Result<Self, EnigmaError> {
        Ok(Session {
            machine: parse_config(config)?,
            configured: false,
        })
    }

    /// Returns the session's machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Processes one input line.
    ///
    /// Setup directives reconfigure the machine and produce no output
    /// (`None`). Anything else produces one output line: blank in, blank
    /// out; otherwise the whitespace-stripped message is converted and
    /// grouped.
    ///
    /// # Errors
    /// Returns [`EnigmaError::MissingSetup`] if a message precedes the
    /// first directive, [`EnigmaError::InvalidSymbol`] for characters
    /// outside the alphabet, and any setup error from
    /// [`apply_setup`].
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>, EnigmaError> {
        if line.trim_start().starts_with('*') {
            apply_setup(&mut self.machine, line)?;
            self.configured = true;
            return Ok(None);
        }
        if !self.configured {
            return Err(EnigmaError::MissingSetup);
        }
        if line.trim().is_empty() {
            return Ok(Some(String::new()));
        }
        let message: String = line.chars().filter(|ch| !ch.is_whitespace()).collect();
        let converted = self.machine.convert_text(&message)?;
        Ok(Some(group_message(&converted)))
    }

    /// Processes a whole input text and returns the output lines.
    ///
    /// # Errors
    /// Stops at the first failing line, with the machine state advanced by
    /// everything already processed.
    pub fn process(&mut self, input: &str) -> Result<Vec<String>, EnigmaError> {
        let mut output = Vec::new();
        for line in input.lines() {
            if let Some(out) = self.process_line(line)? {
                output.push(out);
            }
        }
        Ok(output)
    }
}
