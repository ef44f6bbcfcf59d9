//! Module with a builder that packs an uncompressed automaton into a [`TableSet`].
//!
//! The automaton is described state by state with transitions on byte ranges. Building it
//! computes the equivalence classes, picks a default row for every state where that saves
//! entries and places the rows into the `base`/`check`/`next` arrays by first-fit displacement.

use rustc_hash::FxHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LexError, NamedStartCondition, Result, StartCondition, TableSet};

/// A transition on all bytes of `first..=last` into the state `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DenseTransition {
    /// The first byte of the range.
    pub first: u8,
    /// The last byte of the range, inclusive.
    pub last: u8,
    /// The target state.
    pub target: usize,
}

/// A state of an uncompressed automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DenseState {
    /// The rules accepted in this state. The smallest id has the highest priority.
    #[cfg_attr(feature = "serde", serde(default))]
    pub accept: Vec<u32>,
    /// The transitions. Later transitions override earlier ones on the same byte.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transitions: Vec<DenseTransition>,
}

/// The association of a rule with the start state of its trailing context automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrailingContext {
    /// The rule with trailing context.
    pub rule: u32,
    /// The start state of the automaton that recognizes the trailing context.
    pub state: usize,
}

/// An uncompressed automaton that can be packed into a [`TableSet`].
///
/// ```rust
/// use lexrt::{DenseTables, StartCondition};
///
/// let mut dense = DenseTables::new();
/// let start = dense.add_state(&[]);
/// let digits = dense.add_state(&[1]);
/// dense.add_range(start, b'0'..=b'9', digits);
/// dense.add_range(digits, b'0'..=b'9', digits);
/// dense.set_initial(StartCondition::new(start as u32, start as u32));
/// let tables = dense.build().unwrap();
/// assert_eq!(2, tables.num_states());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DenseTables {
    /// The states of the automaton.
    pub states: Vec<DenseState>,
    /// The rules with trailing context.
    #[cfg_attr(feature = "serde", serde(default))]
    pub trailing_contexts: Vec<TrailingContext>,
    /// The declared start conditions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_conditions: Vec<NamedStartCondition>,
    /// The start condition a scanner starts in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: StartCondition,
}

impl DenseTables {
    /// Creates an empty automaton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state that accepts the given rules and returns its number.
    pub fn add_state(&mut self, accept: &[u32]) -> usize {
        self.states.push(DenseState {
            accept: accept.to_vec(),
            transitions: Vec::new(),
        });
        self.states.len() - 1
    }

    /// Adds a transition on a single byte.
    ///
    /// # Panics
    /// If `from` is no state.
    pub fn add_transition(&mut self, from: usize, byte: u8, to: usize) {
        self.add_range(from, byte..=byte, to);
    }

    /// Adds a transition on a range of bytes.
    ///
    /// # Panics
    /// If `from` is no state.
    pub fn add_range(&mut self, from: usize, bytes: std::ops::RangeInclusive<u8>, to: usize) {
        self.states[from].transitions.push(DenseTransition {
            first: *bytes.start(),
            last: *bytes.end(),
            target: to,
        });
    }

    /// Declares that `rule` has trailing context recognized by the automaton rooted at `state`.
    /// State 0 can't be the root of a trailing context automaton.
    pub fn set_trailing_context(&mut self, rule: u32, state: usize) {
        self.trailing_contexts.push(TrailingContext { rule, state });
    }

    /// Declares a named start condition.
    pub fn add_start_condition(&mut self, name: &str, condition: StartCondition) {
        self.start_conditions
            .push(NamedStartCondition::new(name, condition));
    }

    /// Sets the initial start condition.
    pub fn set_initial(&mut self, condition: StartCondition) {
        self.initial = condition;
    }

    /// Packs the automaton into a validated table set.
    pub fn build(&self) -> Result<TableSet> {
        self.check_references()?;
        let rows = self.dense_rows();
        let (class_of, representatives) = Self::equivalence_classes(&rows);
        let class_rows: Vec<Vec<Option<usize>>> = rows
            .iter()
            .map(|row| representatives.iter().map(|b| row[*b as usize]).collect())
            .collect();
        let defaults = Self::choose_defaults(&class_rows);

        let num_classes = representatives.len();
        let mut base = Vec::with_capacity(self.states.len());
        let mut check: Vec<i32> = Vec::new();
        let mut next: Vec<i32> = Vec::new();
        for (state, row) in class_rows.iter().enumerate() {
            let entries: Vec<(usize, i32)> = match defaults[state] {
                Some(default) => row
                    .iter()
                    .zip(&class_rows[default])
                    .enumerate()
                    .filter(|(_, (own, inherited))| own != inherited)
                    .map(|(class, (own, _))| (class, Self::raw(*own)))
                    .collect(),
                None => row
                    .iter()
                    .enumerate()
                    .filter_map(|(class, target)| target.map(|t| (class, t as i32)))
                    .collect(),
            };
            let offset = Self::first_fit(&check, &entries);
            let needed = offset + num_classes;
            if check.len() < needed {
                check.resize(needed, -1);
                next.resize(needed, -1);
            }
            for (class, target) in entries {
                check[offset + class] = state as i32;
                next[offset + class] = target;
            }
            base.push(offset as u32);
        }

        let accept_lists: Vec<Vec<u32>> = self
            .states
            .iter()
            .map(|s| {
                let mut rules = s.accept.clone();
                rules.sort_unstable();
                rules.dedup();
                rules
            })
            .collect();
        let accept = accept_lists
            .iter()
            .map(|l| l.first().copied().unwrap_or(0))
            .collect();
        let max_rule = self
            .trailing_contexts
            .iter()
            .map(|t| t.rule as usize)
            .max();
        let mut trailing_of = vec![0; max_rule.map_or(0, |m| m + 1)];
        for tc in &self.trailing_contexts {
            trailing_of[tc.rule as usize] = tc.state as u32;
        }

        let tables = TableSet {
            class_of,
            base,
            check,
            next,
            default: defaults
                .iter()
                .map(|d| d.map_or(-1, |d| d as i32))
                .collect(),
            accept,
            trailing_of,
            accept_lists: if accept_lists.iter().any(|l| l.len() > 1) {
                accept_lists
            } else {
                Vec::new()
            },
            start_conditions: self.start_conditions.clone(),
            initial: self.initial,
        };
        tables.validate()?;
        Ok(tables)
    }

    fn check_references(&self) -> Result<()> {
        let num_states = self.states.len();
        for (state, s) in self.states.iter().enumerate() {
            if s.accept.contains(&0) {
                return Err(LexError::malformed(format!(
                    "state {} accepts rule 0",
                    state
                )));
            }
            if let Some(t) = s.transitions.iter().find(|t| t.target >= num_states) {
                return Err(LexError::malformed(format!(
                    "transition of state {} into missing state {}",
                    state, t.target
                )));
            }
        }
        if let Some(tc) = self
            .trailing_contexts
            .iter()
            .find(|tc| tc.rule == 0 || tc.state == 0 || tc.state >= num_states)
        {
            return Err(LexError::malformed(format!(
                "invalid trailing context {:?}",
                tc
            )));
        }
        Ok(())
    }

    // One row of 256 targets per state.
    fn dense_rows(&self) -> Vec<Vec<Option<usize>>> {
        self.states
            .iter()
            .map(|state| {
                let mut row = vec![None; 256];
                for t in &state.transitions {
                    for byte in t.first..=t.last {
                        row[byte as usize] = Some(t.target);
                    }
                }
                row
            })
            .collect()
    }

    // Bytes with identical columns share a class. Classes are numbered in order of their first
    // byte. Returns the class map and one representative byte per class.
    fn equivalence_classes(rows: &[Vec<Option<usize>>]) -> (Vec<u32>, Vec<u8>) {
        let mut classes: FxHashMap<Vec<Option<usize>>, u32> = FxHashMap::default();
        let mut representatives = Vec::new();
        let mut class_of = Vec::with_capacity(256);
        for byte in 0..=255u8 {
            let column: Vec<Option<usize>> = rows.iter().map(|row| row[byte as usize]).collect();
            let next_class = classes.len() as u32;
            let class = *classes.entry(column).or_insert_with(|| {
                representatives.push(byte);
                next_class
            });
            class_of.push(class);
        }
        (class_of, representatives)
    }

    // A state uses an earlier state as default if that needs fewer own entries.
    fn choose_defaults(class_rows: &[Vec<Option<usize>>]) -> Vec<Option<usize>> {
        class_rows
            .iter()
            .enumerate()
            .map(|(state, row)| {
                let own = row.iter().filter(|t| t.is_some()).count();
                (0..state)
                    .map(|candidate| {
                        let diff = row
                            .iter()
                            .zip(&class_rows[candidate])
                            .filter(|(a, b)| a != b)
                            .count();
                        (diff, candidate)
                    })
                    .filter(|(diff, _)| *diff < own)
                    .min()
                    .map(|(_, candidate)| candidate)
            })
            .collect()
    }

    fn first_fit(check: &[i32], entries: &[(usize, i32)]) -> usize {
        (0..)
            .find(|offset| {
                entries.iter().all(|(class, _)| {
                    check.get(offset + class).map_or(true, |owner| *owner < 0)
                })
            })
            .unwrap_or(check.len())
    }

    fn raw(target: Option<usize>) -> i32 {
        target.map_or(-1, |t| t as i32)
    }
}
