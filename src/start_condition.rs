#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A start condition, i.e. the lexical mode the scanner is currently in.
///
/// Start conditions are known from Flex, see
/// <https://www.cs.princeton.edu/~appel/modern/c/software/flex/flex.html#SEC11>.
///
/// A start condition carries two entry states into the table set. The `state` is used for every
/// scan attempt. The `bol_state` is additionally used when the attempt starts at the beginning of
/// a line, so that rules anchored with `^` can take part in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartCondition {
    /// The entry state of the default track.
    pub state: u32,
    /// The entry state of the beginning-of-line track.
    pub bol_state: u32,
}

impl StartCondition {
    /// Creates a new start condition from its two entry states.
    pub const fn new(state: u32, bol_state: u32) -> Self {
        Self { state, bol_state }
    }

    /// Returns true if the beginning-of-line track differs from the default track.
    #[inline]
    pub fn has_bol_track(&self) -> bool {
        self.state != self.bol_state
    }
}

impl std::fmt::Display for StartCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}^{}", self.state, self.bol_state)
    }
}

/// A start condition together with the name it was declared with, e.g. `INITIAL` or `STRING`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedStartCondition {
    /// The name of the start condition.
    pub name: String,
    /// The entry states.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub condition: StartCondition,
}

impl NamedStartCondition {
    /// Creates a new named start condition.
    pub fn new(name: &str, condition: StartCondition) -> Self {
        Self {
            name: name.to_string(),
            condition,
        }
    }
}
