//! Module with the table set type.
//!
//! A table set is the output of a lexer generator: a compressed DFA transition table together
//! with the mapping of input bytes to equivalence classes, the accepting rule of every state and
//! the start states of the automata that verify trailing context.
//!
//! The transition from state `s` on class `c` is found by probing `base[s] + c`. If
//! `check[base[s] + c] == s` the entry belongs to `s` and `next[base[s] + c]` is the target state.
//! Otherwise the lookup continues with `default[s]`. The chain ends at `-1`, the dead state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LexError, NamedStartCondition, Result, StartCondition};

/// The tables that drive a scanner.
///
/// Table sets are usually produced by a generator and loaded with [`TableSet::from_reader`] or
/// built with [`crate::DenseTables`]. They are immutable while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableSet {
    /// Maps every byte value to its equivalence class. Must have exactly 256 entries.
    pub class_of: Vec<u32>,
    /// The row offset of each state into `check` and `next`.
    pub base: Vec<u32>,
    /// The owner state of each entry in `next`, `-1` for unused slots.
    pub check: Vec<i32>,
    /// The target state of each entry, `-1` for an explicit transition into the dead state.
    pub next: Vec<i32>,
    /// The state whose row is consulted when a state has no own entry, `-1` for none.
    pub default: Vec<i32>,
    /// The rule accepted in each state, `0` for non-accepting states.
    pub accept: Vec<u32>,
    /// Indexed by rule id, the start state of the automaton that verifies the trailing context of
    /// that rule. `0` (or a missing entry) means the rule has no trailing context.
    #[cfg_attr(feature = "serde", serde(default))]
    pub trailing_of: Vec<u32>,
    /// Optionally, for each state all rules accepted there in ascending order.
    /// If empty only `accept` is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub accept_lists: Vec<Vec<u32>>,
    /// The declared start conditions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_conditions: Vec<NamedStartCondition>,
    /// The start condition a new scanner starts in.
    pub initial: StartCondition,
}

impl TableSet {
    /// Returns the number of states.
    #[inline]
    pub fn num_states(&self) -> usize {
        self.base.len()
    }

    /// Returns the number of equivalence classes.
    pub fn num_classes(&self) -> usize {
        self.class_of
            .iter()
            .max()
            .map_or(0, |max| *max as usize + 1)
    }

    /// Returns the start condition with the given name.
    pub fn start_condition(&self, name: &str) -> Option<StartCondition> {
        self.start_conditions
            .iter()
            .find(|sc| sc.name == name)
            .map(|sc| sc.condition)
    }

    /// Loads a table set from JSON and validates it.
    #[cfg(feature = "serde")]
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let tables: TableSet = serde_json::from_reader(reader)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Checks the structural invariants of the tables.
    ///
    /// A table set that passes validation can't lead to out of bounds accesses or endless
    /// default chains during scanning.
    pub fn validate(&self) -> Result<()> {
        if self.class_of.len() != 256 {
            return Err(LexError::malformed(format!(
                "class_of must have 256 entries, found {}",
                self.class_of.len()
            )));
        }
        let num_states = self.num_states();
        if num_states == 0 {
            return Err(LexError::malformed("no states"));
        }
        if self.default.len() != num_states || self.accept.len() != num_states {
            return Err(LexError::malformed(format!(
                "base, default and accept differ in length: {}, {}, {}",
                num_states,
                self.default.len(),
                self.accept.len()
            )));
        }
        if self.check.len() != self.next.len() {
            return Err(LexError::malformed(format!(
                "check and next differ in length: {}, {}",
                self.check.len(),
                self.next.len()
            )));
        }
        let num_classes = self.num_classes();
        for (state, base) in self.base.iter().enumerate() {
            if *base as usize + num_classes > self.check.len() {
                return Err(LexError::malformed(format!(
                    "row of state {} at base {} exceeds the table length {}",
                    state,
                    base,
                    self.check.len()
                )));
            }
        }
        let in_range = |raw: i32| raw < 0 || (raw as usize) < num_states;
        if let Some(index) = self.check.iter().position(|c| !in_range(*c)) {
            return Err(LexError::malformed(format!(
                "check[{}] = {} is no state",
                index, self.check[index]
            )));
        }
        if let Some(index) = self.next.iter().position(|n| !in_range(*n)) {
            return Err(LexError::malformed(format!(
                "next[{}] = {} is no state",
                index, self.next[index]
            )));
        }
        if let Some(state) = self.default.iter().position(|d| !in_range(*d)) {
            return Err(LexError::malformed(format!(
                "default[{}] = {} is no state",
                state, self.default[state]
            )));
        }
        self.validate_default_chains()?;
        if let Some(rule) = self
            .trailing_of
            .iter()
            .position(|t| *t as usize >= num_states)
        {
            return Err(LexError::malformed(format!(
                "trailing context state of rule {} is no state",
                rule
            )));
        }
        self.validate_accept_lists()?;
        for sc in std::iter::once(&self.initial)
            .chain(self.start_conditions.iter().map(|sc| &sc.condition))
        {
            if sc.state as usize >= num_states || sc.bol_state as usize >= num_states {
                return Err(LexError::malformed(format!(
                    "start condition {} refers to a missing state",
                    sc
                )));
            }
        }
        Ok(())
    }

    // Every default chain must reach -1 within num_states steps.
    fn validate_default_chains(&self) -> Result<()> {
        // 0 = unknown, 1 = on the current path, 2 = terminates
        let mut marks = vec![0u8; self.num_states()];
        for start in 0..self.num_states() {
            let mut path = Vec::new();
            let mut state = start as i32;
            while state >= 0 {
                match marks[state as usize] {
                    2 => break,
                    1 => {
                        return Err(LexError::malformed(format!(
                            "default chain of state {} is cyclic",
                            start
                        )))
                    }
                    _ => {
                        marks[state as usize] = 1;
                        path.push(state as usize);
                        state = self.default[state as usize];
                    }
                }
            }
            for s in path {
                marks[s] = 2;
            }
        }
        Ok(())
    }

    fn validate_accept_lists(&self) -> Result<()> {
        if self.accept_lists.is_empty() {
            return Ok(());
        }
        if self.accept_lists.len() != self.num_states() {
            return Err(LexError::malformed(format!(
                "accept_lists has {} entries for {} states",
                self.accept_lists.len(),
                self.num_states()
            )));
        }
        for (state, (list, accept)) in self.accept_lists.iter().zip(&self.accept).enumerate() {
            let consistent = list.first().copied().unwrap_or(0) == *accept
                && list.windows(2).all(|w| w[0] < w[1]);
            if !consistent {
                return Err(LexError::malformed(format!(
                    "accept list {:?} of state {} doesn't start with its accepted rule {}",
                    list, state, accept
                )));
            }
        }
        Ok(())
    }

    /// Renders the automaton of the tables in Graphviz dot format.
    #[cfg(feature = "dot_writer")]
    pub fn render_dot<W: std::io::Write>(&self, label: &str, output: &mut W) -> Result<()> {
        self.validate()?;
        crate::internal::dot::table_set_render(self, label, output)
    }
}
