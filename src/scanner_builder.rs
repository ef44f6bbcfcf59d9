use std::io::{Read, Write};

use crate::internal::BufferConfig;
use crate::{LexError, LexErrorKind, Result, Scanner, StartCondition, TableSet};

/// A builder for creating a scanner.
#[derive(Debug, Clone)]
pub struct ScannerBuilder<'t> {
    tables: &'t TableSet,
    config: BufferConfig,
    initial_capacity: Option<usize>,
    start_condition: Option<StartCondition>,
    start_condition_name: Option<String>,
}

impl<'t> ScannerBuilder<'t> {
    /// Creates a new scanner builder for the given table set.
    pub fn new(tables: &'t TableSet) -> Self {
        Self {
            tables,
            config: BufferConfig::default(),
            initial_capacity: None,
            start_condition: None,
            start_condition_name: None,
        }
    }

    /// Refill the input buffer line by line. Use this if the source is a terminal.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.config.interactive = interactive;
        self
    }

    /// Sets the number of bytes requested from the source per refill.
    /// Defaults to 8192. A value of 0 is treated as 1.
    pub fn read_size(mut self, read_size: usize) -> Self {
        self.config.read_size = read_size.max(1);
        self
    }

    /// Sets the capacity the input buffer starts with.
    /// Defaults to one more than the read size.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Limits the capacity of the input buffer. Growing beyond the limit fails with
    /// [`LexErrorKind::AllocationFailure`].
    pub fn max_buffer_size(mut self, max: usize) -> Self {
        self.config.max_capacity = Some(max);
        self
    }

    /// Sets the start condition the scanner starts in.
    /// Defaults to the initial start condition of the table set.
    pub fn start_condition(mut self, start_condition: StartCondition) -> Self {
        self.start_condition = Some(start_condition);
        self.start_condition_name = None;
        self
    }

    /// Sets the start condition the scanner starts in by its name.
    pub fn start_condition_named(mut self, name: &str) -> Self {
        self.start_condition_name = Some(name.to_string());
        self.start_condition = None;
        self
    }

    /// Validates the table set and builds the scanner.
    pub fn build<R: Read, W: Write>(self, source: R, output: W) -> Result<Scanner<'t, R, W>> {
        self.tables.validate()?;
        let start_condition = match (&self.start_condition_name, self.start_condition) {
            (Some(name), _) => self.tables.start_condition(name).ok_or_else(|| {
                LexError::new(LexErrorKind::UnknownStartCondition(name.clone()))
            })?,
            (None, Some(start_condition)) => start_condition,
            (None, None) => self.tables.initial,
        };
        let mut config = self.config;
        config.initial_capacity = self
            .initial_capacity
            .unwrap_or_else(|| config.read_size.saturating_add(1));
        Scanner::new(self.tables, source, output, config, start_condition)
    }
}
