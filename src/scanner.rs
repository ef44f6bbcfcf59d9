use std::io::{Read, Write};

use log::{debug, trace};

use crate::internal::{
    BufferConfig, DualTrackMatcher, HeldByte, InputBuffer, MatchWindow, RuleID, ScanResult,
    TableInterpreter,
};
use crate::{
    Flow, LexError, LexErrorKind, Result, RuleActions, ScanStatus, StartCondition, TableSet,
};

/// A table driven scanner.
///
/// The scanner reads bytes from a source `R`, finds the longest match of the rules encoded in a
/// [`TableSet`] and hands each match to a [`RuleActions`] implementation. Bytes no rule matches
/// are copied to the output `W`.
///
/// Start conditions select the entry states of the automaton. They are known from Flex, see
/// <https://www.cs.princeton.edu/~appel/modern/c/software/flex/flex.html#SEC11>.
///
/// During an action the matched text is terminated in the buffer, i.e. the byte behind it is
/// temporarily overwritten. The byte is put back when the action ends or when the action reads or
/// inserts input.
///
/// Use the [`crate::ScannerBuilder`] to create a scanner.
pub struct Scanner<'t, R, W> {
    tables: &'t TableSet,
    buffer: InputBuffer<R>,
    output: W,
    start_condition: StartCondition,
    window: MatchWindow,
    rule: usize,
    held: Option<HeldByte>,
    more: bool,
    // Unmatched bytes not yet written to the output.
    echo: Option<MatchWindow>,
    line_number: usize,
}

impl<'t, R: Read, W: Write> Scanner<'t, R, W> {
    pub(crate) fn new(
        tables: &'t TableSet,
        source: R,
        output: W,
        config: BufferConfig,
        start_condition: StartCondition,
    ) -> Result<Self> {
        TableInterpreter::new(tables).entry_states(start_condition)?;
        Ok(Self {
            tables,
            buffer: InputBuffer::new(source, config)?,
            output,
            start_condition,
            window: MatchWindow::default(),
            rule: 0,
            held: None,
            more: false,
            echo: None,
            line_number: 1,
        })
    }

    /// Scans the input and runs the actions of the matched rules until the input is exhausted or
    /// an action returns [`Flow::Return`]. A terminated scan can be resumed by calling this
    /// function again.
    ///
    /// An error from an action aborts scanning. The matched text is restored before the error is
    /// returned.
    pub fn scan<A>(&mut self, actions: &mut A) -> Result<ScanStatus>
    where
        A: RuleActions<'t, R, W>,
    {
        self.restore_boundary();
        loop {
            self.prepare_attempt()?;
            let start = self.buffer.cursor();
            let at_bol = self.at_bol();
            let result =
                DualTrackMatcher::new(TableInterpreter::new(self.tables), &mut self.buffer)
                    .find_match(self.start_condition, at_bol)?;
            match result {
                ScanResult::EndOfInput => {
                    self.flush_echo()?;
                    self.more = false;
                    if actions.wrap(self)? {
                        debug!("Input exhausted in line {}", self.line_number);
                        return Ok(ScanStatus::InputExhausted);
                    }
                    trace!("Continue scanning after wrap");
                }
                ScanResult::NoMatch => {
                    self.more = false;
                    self.echo_next_byte()?;
                }
                ScanResult::Accepted { rule, length } => {
                    self.flush_echo()?;
                    let text_start = if std::mem::take(&mut self.more) {
                        self.window.start()
                    } else {
                        start
                    };
                    self.window = MatchWindow::new(text_start, start + length - text_start);
                    self.rule = rule.as_usize();
                    self.line_number += count_newlines(self.buffer.slice(start, start + length));
                    if let Flow::Return(token) = self.dispatch(rule, actions)? {
                        trace!("Rule {} returned token {}", rule, token);
                        return Ok(ScanStatus::Terminated(token));
                    }
                }
            }
        }
    }

    /// Like [`Scanner::scan`], with a closure as the only action.
    pub fn scan_with<F>(&mut self, mut action: F) -> Result<ScanStatus>
    where
        F: FnMut(usize, &mut Self) -> Result<Flow>,
    {
        self.scan(&mut action)
    }

    // Runs the action with the matched text terminated. The terminator is removed whatever the
    // action returns.
    fn dispatch<A>(&mut self, rule: RuleID, actions: &mut A) -> Result<Flow>
    where
        A: RuleActions<'t, R, W>,
    {
        self.held = self.buffer.mark_boundary(self.window.end());
        let flow = actions.on_match(rule.as_usize(), self);
        self.restore_boundary();
        flow
    }

    // Discards consumed bytes that are no longer needed. The byte before the cursor is kept for
    // the beginning of line check. A run of unmatched bytes is written out once it reaches the
    // read size, so it never holds more than that in the buffer.
    fn prepare_attempt(&mut self) -> Result<()> {
        if self
            .echo
            .is_some_and(|run| run.len() >= self.buffer.read_size())
        {
            self.flush_echo()?;
        }
        let mut keep_from = self.buffer.cursor().saturating_sub(1);
        if self.more {
            keep_from = keep_from.min(self.window.start());
        }
        if let Some(echo) = &self.echo {
            keep_from = keep_from.min(echo.start());
        }
        let shift = self.buffer.compact(keep_from);
        if shift > 0 {
            self.window.rebase(shift);
            if let Some(echo) = self.echo.as_mut() {
                echo.rebase(shift);
            }
        }
        Ok(())
    }

    fn at_bol(&self) -> bool {
        let cursor = self.buffer.cursor();
        cursor == 0 || self.buffer.byte_at(cursor - 1) == Some(b'\n')
    }

    fn echo_next_byte(&mut self) -> Result<()> {
        let offset = self.buffer.cursor();
        if let Some(byte) = self.buffer.read_char()? {
            match self.echo.as_mut() {
                Some(run) if run.end() == offset => run.extend(1),
                _ => {
                    self.flush_echo()?;
                    self.echo = Some(MatchWindow::new(offset, 1));
                }
            }
            if byte == b'\n' {
                self.line_number += 1;
            }
        }
        Ok(())
    }

    fn flush_echo(&mut self) -> Result<()> {
        if let Some(run) = self.echo.take() {
            trace!("Echo {} unmatched byte(s)", run.len());
            self.output
                .write_all(self.buffer.slice(run.start(), run.end()))?;
        }
        Ok(())
    }

    fn restore_boundary(&mut self) {
        if let Some(held) = self.held.take() {
            self.buffer.restore_boundary(held);
        }
    }

    /// Returns the text of the current match.
    ///
    /// The text is only valid until the next match attempt starts. After [`Scanner::scan`]
    /// returned [`ScanStatus::InputExhausted`] it is empty, because the final attempt already
    /// discarded the consumed input.
    #[doc(alias = "yytext")]
    pub fn text(&self) -> &[u8] {
        self.buffer.slice(self.window.start(), self.window.end())
    }

    /// Returns the text of the current match as string slice if it is valid UTF-8.
    pub fn text_str(&self) -> Option<&str> {
        std::str::from_utf8(self.text()).ok()
    }

    /// Returns the length of the current match in bytes.
    #[doc(alias = "yyleng")]
    pub fn length(&self) -> usize {
        self.window.len()
    }

    /// Returns the rule of the current match.
    pub fn rule(&self) -> usize {
        self.rule
    }

    /// Returns the number of the line the cursor is in. Lines are counted from 1.
    #[doc(alias = "yylineno")]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the active start condition.
    pub fn start_condition(&self) -> StartCondition {
        self.start_condition
    }

    /// Activates a start condition. It takes effect with the next match attempt.
    #[doc(alias = "BEGIN")]
    pub fn begin(&mut self, start_condition: StartCondition) -> Result<()> {
        TableInterpreter::new(self.tables).entry_states(start_condition)?;
        trace!(
            "Switch start condition from {} to {}",
            self.start_condition,
            start_condition
        );
        self.start_condition = start_condition;
        Ok(())
    }

    /// Activates a start condition declared in the table set.
    pub fn begin_named(&mut self, name: &str) -> Result<()> {
        let start_condition = self.tables.start_condition(name).ok_or_else(|| {
            LexError::new(LexErrorKind::UnknownStartCondition(name.to_string()))
        })?;
        self.begin(start_condition)
    }

    /// Reads the next byte behind the consumed input. The byte becomes part of no match.
    /// Returns `None` at the end of the input.
    pub fn input(&mut self) -> Result<Option<u8>> {
        self.restore_boundary();
        let byte = self.buffer.read_char()?;
        if byte == Some(b'\n') {
            self.line_number += 1;
        }
        Ok(byte)
    }

    /// Pushes a byte back into the input so that it is the next byte scanned or returned by
    /// [`Scanner::input`]. The matched text stays intact, the buffer grows when necessary.
    pub fn unput(&mut self, byte: u8) -> Result<()> {
        let terminated = self.held.is_some();
        self.restore_boundary();
        self.buffer.insert_at_cursor(byte)?;
        if terminated {
            self.held = self.buffer.mark_boundary(self.window.end());
        }
        if byte == b'\n' {
            self.line_number = self.line_number.saturating_sub(1).max(1);
        }
        Ok(())
    }

    /// Keeps the first `n` bytes of the match and returns the rest to the input.
    #[doc(alias = "yyless")]
    pub fn less(&mut self, n: usize) -> Result<()> {
        let length = self.window.len();
        if n > length {
            return Err(LexError::new(LexErrorKind::LessOutOfRange {
                requested: n,
                length,
            }));
        }
        let terminated = self.held.is_some();
        self.restore_boundary();
        let new_end = self.window.start() + n;
        // Returned newlines are counted again when rescanned.
        let returned = count_newlines(self.buffer.slice(new_end, self.buffer.cursor()));
        self.line_number = self.line_number.saturating_sub(returned).max(1);
        self.buffer.rewind_to(new_end);
        self.window.truncate(n);
        if terminated {
            self.held = self.buffer.mark_boundary(new_end);
        }
        Ok(())
    }

    /// Prepends the text of the current match to the text of the next match.
    #[doc(alias = "yymore")]
    pub fn more(&mut self) {
        self.more = true;
    }

    /// Writes the text of the current match to the output.
    #[doc(alias = "ECHO")]
    pub fn echo(&mut self) -> Result<()> {
        let text = self.buffer.slice(self.window.start(), self.window.end());
        self.output.write_all(text)?;
        Ok(())
    }

    /// Switches to a new source. Buffered input is dropped, the start condition is kept.
    #[doc(alias = "yyrestart")]
    pub fn restart(&mut self, source: R) -> Result<()> {
        self.flush_echo()?;
        self.restore_boundary();
        self.buffer.reset(source);
        self.window = MatchWindow::default();
        self.more = false;
        debug!("Restart with a new source");
        Ok(())
    }

    /// Returns the capacity of the input buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the table set of the scanner.
    pub fn tables(&self) -> &'t TableSet {
        self.tables
    }

    /// Returns the output.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Returns the output mutably, e.g. to write text from an action.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consumes the scanner and returns the output.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R, W> std::fmt::Debug for Scanner<'_, R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("buffer", &self.buffer)
            .field("start_condition", &self.start_condition)
            .field("window", &self.window)
            .field("rule", &self.rule)
            .field("line_number", &self.line_number)
            .finish()
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|b| **b == b'\n').count()
}
