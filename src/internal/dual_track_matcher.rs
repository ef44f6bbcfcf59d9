//! The longest match search of one scan attempt.
//!
//! The default track starts at the default entry state of the start condition. At the beginning
//! of a line a second track starts at the BOL entry state if that differs. Both tracks advance in
//! lockstep over the same bytes until both are dead or the input is exhausted. The default track
//! always takes part, so an attempt at the beginning of a line that finds nothing on the BOL track
//! still yields what the default track found.

use std::cmp::Ordering;
use std::io::Read;

use log::trace;

use crate::{Result, StartCondition};

use super::{
    InputBuffer, RuleID, TableInterpreter, TrackKind, TrackState, TrailingContextResolver,
    TrailingMatch,
};

/// The outcome of one scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanResult {
    /// A rule matched `length` bytes. The cursor stands behind the match.
    Accepted { rule: RuleID, length: usize },
    /// No rule matched. The cursor is unchanged.
    NoMatch,
    /// There is no more input.
    EndOfInput,
}

// A rule that could end the attempt.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    rule: RuleID,
    head_end: usize,
    extent_end: usize,
}

impl Candidate {
    // The longest extent wins, then the rule listed first, then the longer head.
    fn beats(&self, other: &Candidate) -> bool {
        match self.extent_end.cmp(&other.extent_end) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.rule.cmp(&other.rule) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.head_end > other.head_end,
            },
        }
    }
}

pub(crate) struct DualTrackMatcher<'a, 't, R> {
    interp: TableInterpreter<'t>,
    buffer: &'a mut InputBuffer<R>,
}

impl<'a, 't, R: Read> DualTrackMatcher<'a, 't, R> {
    pub(crate) fn new(interp: TableInterpreter<'t>, buffer: &'a mut InputBuffer<R>) -> Self {
        Self { interp, buffer }
    }

    /// Searches the longest match at the cursor.
    pub(crate) fn find_match(&mut self, sc: StartCondition, at_bol: bool) -> Result<ScanResult> {
        let (default_entry, bol_entry) = self.interp.entry_states(sc)?;
        let start = self.buffer.cursor();
        let mut tracks = vec![TrackState::new(TrackKind::Default, default_entry)];
        if at_bol && sc.has_bol_track() {
            tracks.push(TrackState::new(TrackKind::Bol, bol_entry));
        }
        trace!(
            "Scan attempt at offset {} in start condition {} with {} track(s)",
            start,
            sc,
            tracks.len()
        );

        let mut consumed = false;
        while tracks.iter().any(|t| !t.is_dead()) {
            let Some(byte) = self.buffer.read_char()? else {
                break;
            };
            consumed = true;
            let end = self.buffer.cursor();
            let class = self.interp.class_of(byte)?;
            for track in tracks.iter_mut() {
                if let Some(state) = track.current() {
                    let next = self.interp.transition(state, class)?;
                    let accepting = match next {
                        Some(next) => self.interp.accepted_rule(next)?.is_rule(),
                        None => false,
                    };
                    track.advance(next, end, accepting);
                }
            }
            if tracks.iter().all(|t| t.is_dead()) {
                // The byte that killed the last track is not part of any match.
                self.buffer.unread_char();
            }
        }
        if !consumed {
            return Ok(ScanResult::EndOfInput);
        }
        trace!("Scanned {} bytes", self.buffer.cursor() - start);

        match self.select(start, &tracks)? {
            Some(winner) => {
                self.buffer.rewind_to(winner.head_end);
                trace!(
                    "Rule {} matched {} bytes at offset {}",
                    winner.rule,
                    winner.head_end - start,
                    start
                );
                Ok(ScanResult::Accepted {
                    rule: winner.rule,
                    length: winner.head_end - start,
                })
            }
            None => {
                self.buffer.rewind_to(start);
                trace!("No rule matched at offset {}", start);
                Ok(ScanResult::NoMatch)
            }
        }
    }

    // Every rule accepted at every accept point of both tracks is a candidate. Rules with
    // trailing context are only candidates if the context follows, which is checked once per
    // track and rule.
    fn select(&mut self, start: usize, tracks: &[TrackState]) -> Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        let mut verdicts: Vec<(TrackKind, RuleID, Option<TrailingMatch>)> = Vec::new();
        for track in tracks {
            for accept in track.accepts_longest_first() {
                for rule in self.interp.accepted_rules(accept.state)? {
                    let rule = RuleID::new(*rule);
                    let candidate = match self.interp.trailing_of(rule)? {
                        None => Some(Candidate {
                            rule,
                            head_end: accept.end,
                            extent_end: accept.end,
                        }),
                        Some(trailing) => {
                            let verdict = match verdicts
                                .iter()
                                .find(|(kind, r, _)| *kind == track.kind() && *r == rule)
                            {
                                Some((_, _, verdict)) => *verdict,
                                None => {
                                    let verdict = TrailingContextResolver::new(
                                        self.interp,
                                        &mut *self.buffer,
                                    )
                                    .resolve(track.entry(), rule, trailing, start)?;
                                    verdicts.push((track.kind(), rule, verdict));
                                    verdict
                                }
                            };
                            verdict.map(|m| Candidate {
                                rule,
                                head_end: m.head_end,
                                extent_end: m.extent_end,
                            })
                        }
                    };
                    if let Some(candidate) = candidate {
                        if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                            best = Some(candidate);
                        }
                    }
                }
            }
        }
        Ok(best)
    }
}
