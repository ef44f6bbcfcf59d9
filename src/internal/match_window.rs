/// The matched text as a range of buffer offsets.
///
/// A window is only valid until the next scan attempt starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct MatchWindow {
    start: usize,
    len: usize,
}

impl MatchWindow {
    #[inline]
    pub(crate) fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.start
    }

    /// The offset behind the last byte.
    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Extends the window by `n` bytes at its end.
    #[inline]
    pub(crate) fn extend(&mut self, n: usize) {
        self.len += n;
    }

    /// Keeps only the first `n` bytes.
    #[inline]
    pub(crate) fn truncate(&mut self, n: usize) {
        self.len = self.len.min(n);
    }

    /// Adjusts the window after `shift` bytes were discarded from the buffer front.
    /// A window that lost its bytes becomes empty.
    pub(crate) fn rebase(&mut self, shift: usize) {
        if self.start >= shift {
            self.start -= shift;
        } else {
            *self = MatchWindow::default();
        }
    }
}
