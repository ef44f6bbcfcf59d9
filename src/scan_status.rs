/// What the scan loop should do after an action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flow {
    /// Continue scanning.
    #[default]
    Continue,
    /// Stop scanning and hand the value to the caller of [`crate::Scanner::scan`].
    /// This is how an action returns a token.
    Return(usize),
}

/// How a call to [`crate::Scanner::scan`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanStatus {
    /// The input is exhausted and the wrap hook didn't provide more.
    InputExhausted,
    /// An action stopped scanning with [`Flow::Return`]. Scanning can be resumed by calling
    /// `scan` again.
    Terminated(usize),
}
