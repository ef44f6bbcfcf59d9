/// Module with conversion to graphviz dot format
#[cfg(feature = "dot_writer")]
pub(crate) mod dot;

/// Module that provides the longest match search of a scan attempt.
mod dual_track_matcher;
pub(crate) use dual_track_matcher::{DualTrackMatcher, ScanResult};

/// Module for several ID types.
mod ids;
pub(crate) use ids::{ClassID, RuleID, StateID};

/// Module that provides the input buffer.
mod input_buffer;
pub(crate) use input_buffer::{BufferConfig, HeldByte, InputBuffer};

/// Module that provides the match window type.
mod match_window;
pub(crate) use match_window::MatchWindow;

/// Module that provides functions and types related to matching states.
mod matching_state;
pub(crate) use matching_state::{TrackKind, TrackState};

/// Module that provides the transition lookup in a table set.
mod table_interpreter;
pub(crate) use table_interpreter::TableInterpreter;

/// Module that provides the verification of trailing context.
mod trailing_context;
pub(crate) use trailing_context::{TrailingContextResolver, TrailingMatch};
