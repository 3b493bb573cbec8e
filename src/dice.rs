use rand::Rng;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Lowest face on a die.
pub const MIN_FACE: u8 = 1;
/// Highest face on a die.
pub const MAX_FACE: u8 = 6;

/// Whether `value` is a face a six-sided die can show.
pub const fn is_face(value: u8) -> bool {
    value >= MIN_FACE && value <= MAX_FACE
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputError {
    #[error("expected {expected} dice, got {got}")]
    WrongCount { expected: usize, got: usize },
    #[error("die value out of range 1-6: {0}")]
    FaceOutOfRange(u8),
    #[error("invalid die value: '{0}'")]
    Parse(String),
}

/// The dice a player rolled this round, in roll order.
///
/// ```
/// use liars_dice::dice::DiceSet;
///
/// let dice: DiceSet = "3 3 5 1 6".parse().unwrap();
/// assert_eq!(dice.len(), 5);
/// assert_eq!(dice.count(3), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiceSet {
    values: Vec<u8>,
}

impl DiceSet {
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Roll `n` fair dice.
    pub fn roll<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let values = (0..n).map(|_| rng.random_range(MIN_FACE..=MAX_FACE)).collect();
        Self { values }
    }

    pub fn try_from_values(values: Vec<u8>) -> Result<Self, InputError> {
        if let Some(&bad) = values.iter().find(|&&v| !is_face(v)) {
            return Err(InputError::FaceOutOfRange(bad));
        }
        Ok(Self { values })
    }

    /// Accept dice reported by an external reader, checking length and range.
    pub fn from_detected(values: &[u8], expected: usize) -> Result<Self, InputError> {
        if values.len() != expected {
            return Err(InputError::WrongCount { expected, got: values.len() });
        }
        Self::try_from_values(values.to_vec())
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of dice showing `face`.
    pub fn count(&self, face: u8) -> u32 {
        self.values.iter().filter(|&&v| v == face).count() as u32
    }

    /// Distinct faces rolled, ascending.
    pub fn distinct_faces(&self) -> Vec<u8> {
        let mut faces = self.values.clone();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Display for DiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.values {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for DiceSet {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<u8>().map_err(|_| InputError::Parse(t.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_values(values)
    }
}

/// Supplies the human player's dice when the engine asks for a roll, e.g. a camera pipeline
/// that reads physical dice. Values are checked by the engine before use.
pub trait DiceSource {
    fn read_dice(&mut self, count: usize) -> Vec<u8>;
}

/// A `DiceSource` that replays fixed rolls in order, then reports nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<Vec<u8>>,
}

impl ScriptedDice {
    pub fn new<I>(rolls: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self { rolls: rolls.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn read_dice(&mut self, _count: usize) -> Vec<u8> {
        self.rolls.pop_front().unwrap_or_default()
    }
}
