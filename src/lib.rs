#![forbid(missing_docs)]
//! # `lexrt`
//! The `lexrt` crate is the runtime of a table driven lexical scanner in the style of `lex` and
//! `flex`.
//! A lexer generator compiles the rules of a scanner into a compressed DFA, the [`TableSet`].
//! This crate interprets such tables over a byte stream, finds the longest match at each position
//! and runs the action of the matched rule.
//!
//! It supports the features known from `flex` scanners:
//! - Start conditions with separate entry states for the beginning of a line, which makes rules
//!   anchored with `^` possible.
//! - Trailing context, i.e. rules of the form `A/B` that match `A` only if followed by `B`.
//! - Editing the input from within an action with [`Scanner::input`], [`Scanner::unput`],
//!   [`Scanner::less`] and [`Scanner::more`].
//! - Copying unmatched input to an output.
//!
//! # Example
//! ```rust
//! use lexrt::{DenseTables, Flow, ScanStatus, ScannerBuilder, StartCondition};
//!
//! // Rule 1: [0-9]+
//! // Rule 2: [a-z]+
//! let mut dense = DenseTables::new();
//! let start = dense.add_state(&[]);
//! let number = dense.add_state(&[1]);
//! let word = dense.add_state(&[2]);
//! dense.add_range(start, b'0'..=b'9', number);
//! dense.add_range(number, b'0'..=b'9', number);
//! dense.add_range(start, b'a'..=b'z', word);
//! dense.add_range(word, b'a'..=b'z', word);
//! dense.set_initial(StartCondition::new(0, 0));
//! let tables = dense.build()?;
//!
//! let mut output = Vec::new();
//! let mut tokens = Vec::new();
//! let mut scanner = ScannerBuilder::new(&tables).build("abc 42".as_bytes(), &mut output)?;
//! let status = scanner.scan_with(|rule, s| {
//!     tokens.push((rule, s.text().to_vec()));
//!     Ok(Flow::Continue)
//! })?;
//! drop(scanner);
//!
//! assert_eq!(ScanStatus::InputExhausted, status);
//! assert_eq!(vec![(2, b"abc".to_vec()), (1, b"42".to_vec())], tokens);
//! // The space matched no rule and was copied to the output.
//! assert_eq!(b" ", output.as_slice());
//! # Ok::<(), lexrt::LexError>(())
//! ```
//!
//! # Crate features
//! - `serde`: Enabled by default. Table sets can be serialized and loaded from JSON with
//!   [`TableSet::from_reader`].
//! - `dot_writer`: Enabled by default. Renders the automaton of a table set in graphviz dot
//!   format with [`TableSet::render_dot`].

/// Module with the rule actions trait
mod actions;
pub use actions::RuleActions;

/// Module that provides a builder for table sets
mod dense_tables;
pub use dense_tables::{DenseState, DenseTables, DenseTransition, TrailingContext};

/// Module with error definitions
mod errors;
pub use errors::{LexError, LexErrorKind, Result};

/// The module with internal implementation details.
mod internal;

/// Module that provides the result types of a scan
mod scan_status;
pub use scan_status::{Flow, ScanStatus};

/// The module with the scanner.
mod scanner;
pub use scanner::Scanner;

/// The module with the scanner builder.
mod scanner_builder;
pub use scanner_builder::ScannerBuilder;

/// Module that provides the start condition types
mod start_condition;
pub use start_condition::{NamedStartCondition, StartCondition};

/// The module with the table set.
mod table_set;
pub use table_set::TableSet;
