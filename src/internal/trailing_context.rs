//! Verification of trailing context.
//!
//! A rule `A/B` accepts in the primary automaton at the end of `A`. It only matches if the text
//! behind that boundary matches `B`, which is recognized by a second automaton rooted at
//! `trailing_of[rule]`. The verification is a self-contained sub-scan over the shared buffer with
//! its own accept tracking. It never re-enters the scan loop.

use std::io::Read;

use log::debug;

use crate::Result;

use super::{InputBuffer, RuleID, StateID, TableInterpreter};

/// A verified trailing context match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrailingMatch {
    /// The end of the head `A`. This is where the token ends.
    pub(crate) head_end: usize,
    /// The end of the trailing part `B`. The match competes with this extent.
    pub(crate) extent_end: usize,
}

impl TrailingMatch {
    // Longer extents win, then longer heads.
    fn is_better_than(&self, other: &TrailingMatch) -> bool {
        (self.extent_end, self.head_end) > (other.extent_end, other.head_end)
    }
}

// A run of the trailing automaton started at one head boundary.
#[derive(Debug)]
struct TrailRun {
    head_end: usize,
    state: StateID,
}

pub(crate) struct TrailingContextResolver<'a, 't, R> {
    interp: TableInterpreter<'t>,
    buffer: &'a mut InputBuffer<R>,
}

impl<'a, 't, R: Read> TrailingContextResolver<'a, 't, R> {
    pub(crate) fn new(interp: TableInterpreter<'t>, buffer: &'a mut InputBuffer<R>) -> Self {
        Self { interp, buffer }
    }

    /// Re-scans from `start` with the primary automaton rooted at `entry`. Every boundary where
    /// the primary automaton accepts `rule` starts a run of the trailing automaton rooted at
    /// `trailing`; all runs advance in lockstep with the primary one.
    ///
    /// Returns the confirmed match with the longest extent, or `None` if no boundary is followed
    /// by the trailing context. The buffer cursor is left at `start` in both cases.
    pub(crate) fn resolve(
        &mut self,
        entry: StateID,
        rule: RuleID,
        trailing: StateID,
        start: usize,
    ) -> Result<Option<TrailingMatch>> {
        self.buffer.rewind_to(start);
        let mut primary = Some(entry);
        let mut runs: Vec<TrailRun> = Vec::new();
        let mut best = None;

        while primary.is_some() || !runs.is_empty() {
            let Some(byte) = self.buffer.read_char()? else {
                break;
            };
            let end = self.buffer.cursor();
            let class = self.interp.class_of(byte)?;

            let mut i = 0;
            while i < runs.len() {
                match self.interp.transition(runs[i].state, class)? {
                    Some(state) => {
                        runs[i].state = state;
                        if self.interp.accepted_rule(state)?.is_rule() {
                            Self::record(&mut best, runs[i].head_end, end);
                        }
                        i += 1;
                    }
                    None => {
                        runs.swap_remove(i);
                    }
                }
            }

            if let Some(state) = primary {
                primary = self.interp.transition(state, class)?;
                if let Some(state) = primary {
                    if self.interp.accepted_rules(state)?.contains(&rule.id()) {
                        if self.interp.accepted_rule(trailing)?.is_rule() {
                            // The trailing context accepts the empty string.
                            Self::record(&mut best, end, end);
                        }
                        runs.push(TrailRun {
                            head_end: end,
                            state: trailing,
                        });
                    }
                }
            }
        }

        self.buffer.rewind_to(start);
        debug!(
            "Trailing context of rule {} from offset {}: {:?}",
            rule, start, best
        );
        Ok(best)
    }

    fn record(best: &mut Option<TrailingMatch>, head_end: usize, extent_end: usize) {
        let candidate = TrailingMatch {
            head_end,
            extent_end,
        };
        if best.as_ref().map_or(true, |b| candidate.is_better_than(b)) {
            *best = Some(candidate);
        }
    }
}
