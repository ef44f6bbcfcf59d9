use super::StateID;

/// Identifies the track a candidate match was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TrackKind {
    /// The track started at the default entry state of the start condition.
    Default,
    /// The track started at the beginning-of-line entry state.
    Bol,
}

/// An accepting state passed through during matching, together with the offset behind the
/// byte that led into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AcceptPoint {
    pub(crate) end: usize,
    pub(crate) state: StateID,
}

/// The state of one automaton run during a scan attempt.
///
/// Maximal munch needs the last accepting state seen, not the state the run ended in. Shorter
/// accepts are kept as well because a trailing context rule accepted later may be rejected, in
/// which case an earlier accept becomes the best candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackState {
    kind: TrackKind,
    entry: StateID,
    // The current state, None if the run is dead.
    current: Option<StateID>,
    // All accepts in ascending order of their end offsets.
    accepts: Vec<AcceptPoint>,
}

impl TrackState {
    pub(crate) fn new(kind: TrackKind, entry: StateID) -> Self {
        Self {
            kind,
            entry,
            current: Some(entry),
            accepts: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> TrackKind {
        self.kind
    }

    #[inline]
    pub(crate) fn entry(&self) -> StateID {
        self.entry
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<StateID> {
        self.current
    }

    #[inline]
    pub(crate) fn is_dead(&self) -> bool {
        self.current.is_none()
    }

    /// Records the result of a transition. `end` is the offset behind the consumed byte.
    pub(crate) fn advance(&mut self, next: Option<StateID>, end: usize, accepting: bool) {
        self.current = next;
        if let (Some(state), true) = (next, accepting) {
            self.accepts.push(AcceptPoint { end, state });
        }
    }

    /// The accepts seen so far, longest first.
    pub(crate) fn accepts_longest_first(&self) -> impl Iterator<Item = &AcceptPoint> {
        self.accepts.iter().rev()
    }

    /// The last accept seen.
    #[cfg(test)]
    pub(crate) fn last_accept(&self) -> Option<&AcceptPoint> {
        self.accepts.last()
    }
}
