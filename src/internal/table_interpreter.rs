use crate::{LexError, Result, StartCondition, TableSet};

use super::{ClassID, RuleID, StateID};

/// Read-only view on a [`TableSet`] that computes transitions.
///
/// All lookups are bounds checked. The tables are validated when a scanner is built, so an error
/// here always points to a defect in the table generator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableInterpreter<'t> {
    tables: &'t TableSet,
}

impl<'t> TableInterpreter<'t> {
    pub(crate) fn new(tables: &'t TableSet) -> Self {
        Self { tables }
    }

    /// Returns the equivalence class of the given byte.
    #[inline]
    pub(crate) fn class_of(&self, byte: u8) -> Result<ClassID> {
        self.tables
            .class_of
            .get(byte as usize)
            .map(|c| ClassID::new(*c))
            .ok_or_else(|| LexError::malformed(format!("no class for byte {:#04x}", byte)))
    }

    /// Computes the target of `state` on `class`, following the default chain.
    /// Returns `None` for the dead state.
    pub(crate) fn transition(&self, state: StateID, class: ClassID) -> Result<Option<StateID>> {
        let mut current = state;
        // A chain can visit each state at most once.
        for _ in 0..=self.tables.num_states() {
            let base = *self
                .tables
                .base
                .get(current.as_usize())
                .ok_or_else(|| LexError::malformed(format!("state {} has no row", current)))?;
            let index = base as usize + class.as_usize();
            let owner = *self.tables.check.get(index).ok_or_else(|| {
                LexError::malformed(format!("check[{}] out of range for state {}", index, current))
            })?;
            if owner == current.id() as i32 {
                let next = *self.tables.next.get(index).ok_or_else(|| {
                    LexError::malformed(format!("next[{}] out of range", index))
                })?;
                return Ok(StateID::from_raw(next));
            }
            let default = *self
                .tables
                .default
                .get(current.as_usize())
                .ok_or_else(|| LexError::malformed(format!("state {} has no default", current)))?;
            match StateID::from_raw(default) {
                Some(default) => current = default,
                None => return Ok(None),
            }
        }
        Err(LexError::malformed(format!(
            "default chain of state {} does not terminate",
            state
        )))
    }

    /// Computes the target of `state` on the class of `byte`.
    #[cfg(test)]
    pub(crate) fn next_state(&self, state: StateID, byte: u8) -> Result<Option<StateID>> {
        self.transition(state, self.class_of(byte)?)
    }

    /// Returns the rule accepted in `state`. Rule 0 means not accepting.
    #[inline]
    pub(crate) fn accepted_rule(&self, state: StateID) -> Result<RuleID> {
        self.tables
            .accept
            .get(state.as_usize())
            .map(|r| RuleID::new(*r))
            .ok_or_else(|| LexError::malformed(format!("state {} has no accept entry", state)))
    }

    /// Returns all rules accepted in `state` in priority order.
    pub(crate) fn accepted_rules(&self, state: StateID) -> Result<&'t [u32]> {
        if !self.tables.accept_lists.is_empty() {
            return self
                .tables
                .accept_lists
                .get(state.as_usize())
                .map(|l| l.as_slice())
                .ok_or_else(|| LexError::malformed(format!("state {} has no accept list", state)));
        }
        let accept = self
            .tables
            .accept
            .get(state.as_usize())
            .ok_or_else(|| LexError::malformed(format!("state {} has no accept entry", state)))?;
        if *accept == 0 {
            Ok(&[])
        } else {
            Ok(std::slice::from_ref(accept))
        }
    }

    /// Returns the start state of the trailing context automaton of `rule`, if any.
    pub(crate) fn trailing_of(&self, rule: RuleID) -> Result<Option<StateID>> {
        match self.tables.trailing_of.get(rule.as_usize()).copied() {
            None | Some(0) => Ok(None),
            Some(state) => self.state(state).map(Some),
        }
    }

    /// Converts a raw entry state into a checked state id.
    pub(crate) fn state(&self, raw: u32) -> Result<StateID> {
        if (raw as usize) < self.tables.num_states() {
            Ok(StateID::new(raw))
        } else {
            Err(LexError::malformed(format!("{} is no state", raw)))
        }
    }

    /// Returns the checked entry states of a start condition.
    pub(crate) fn entry_states(&self, sc: StartCondition) -> Result<(StateID, StateID)> {
        Ok((self.state(sc.state)?, self.state(sc.bol_state)?))
    }
}
