//! DFA engine: the reusable core behind a visual automaton builder.
//!
//! This crate owns everything that is not presentation: the automaton model
//! and its mutation rules, the structural validator, the step simulator, the
//! interchange codec, a playback controller over execution traces, and an
//! autosave store. Rendering, drag-and-drop, and theming are host concerns
//! that call in through these types.
//!
//! ## Core Concepts
//!
//! - **Model** ([`Dfa`]): owns the live [`DfaDefinition`] and keeps it
//!   internally consistent (single initial state, endpoint checks, cascade
//!   deletes). Deliberately permissive about determinism so hosts can show
//!   an in-progress, temporarily-invalid graph.
//! - **Validator** ([`validate`]): pure function over a definition snapshot
//!   producing errors (automaton-breaking) and warnings (quality issues) as
//!   data, never as `Err`.
//! - **Simulator** ([`execute`]): pure function replaying an input string
//!   into an immutable, replayable [`ExecutionTrace`].
//! - **Codec** ([`encode`]/[`decode`]): canonical pretty-JSON interchange
//!   text with an explicit schema check on read.
//! - **Playback** ([`Playback`]): cursor/pause/speed session state over a
//!   trace; stepping never recomputes.
//! - **Store** ([`AutosaveStore`]): fixed-key autosave plus timestamped
//!   snapshots of the encoded definition.
//!
//! ## Data flow
//!
//! ```text
//! host mutations -> Dfa (invariants enforced)
//!                -> validate(snapshot)      (advisory, re-run per mutation)
//!       on run:  -> execute(snapshot, input) -> ExecutionTrace -> Playback
//! ```

mod automaton;
mod codec;
mod error;
mod playback;
mod simulate;
mod store;
mod validate;

pub use automaton::{Dfa, MetadataUpdate, StateUpdate, TransitionUpdate};
pub use codec::{decode, encode};
pub use error::{DfaError, DfaResult};
pub use playback::Playback;
pub use simulate::{
    accepts, execute, execute_up_to_step, step_count, ExecutionStep, ExecutionTrace,
};
pub use store::{AutosaveStore, SnapshotInfo, StoreStats, STUDIO_DIR};
pub use validate::{
    reachable_states, validate, ValidationError, ValidationErrorKind, ValidationResult,
    ValidationWarning, ValidationWarningKind,
};

// Re-export the domain model so hosts can depend on this crate alone.
pub use dfa_studio_core::{
    DfaDefinition, DfaMetadata, DfaState, DfaTransition, Position, StateId, StateKind,
    TransitionId, DEFAULT_ALPHABET,
};
