//! Error types for the engine.

use dfa_studio_core::StateId;
use thiserror::Error;

/// Result type alias for engine operations.
pub type DfaResult<T> = Result<T, DfaError>;

/// Errors raised by the engine.
///
/// All of these are expected, recoverable conditions: a failed mutation
/// leaves the model untouched, and nothing here should abort a host. The
/// validator and the simulator never produce `Err` - they report problems
/// as data instead.
#[derive(Debug, Error)]
pub enum DfaError {
    /// An update referenced an id that does not exist.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// A transition endpoint references a nonexistent state.
    #[error("transition endpoint references unknown state: {id}")]
    UnknownState { id: StateId },

    /// A transition symbol is not in the current alphabet.
    #[error("symbol '{symbol}' not in alphabet {{{alphabet}}}")]
    SymbolNotInAlphabet { symbol: char, alphabet: String },

    /// `set_alphabet` was given zero symbols.
    #[error("alphabet cannot be empty")]
    EmptyAlphabet,

    /// An alphabet symbol is not exactly one character.
    #[error("alphabet symbols must be single characters: '{symbol}'")]
    MultiCharSymbol { symbol: String },

    /// Decode input is not well-formed structured text at all.
    #[error("malformed automaton document: {message}")]
    Parse { message: String },

    /// Decode input is well-formed but violates the document schema.
    #[error("invalid automaton document: {message}")]
    Schema { message: String },

    /// Serialization error while encoding.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O error (store file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
