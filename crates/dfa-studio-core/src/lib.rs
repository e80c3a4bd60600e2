//! Core domain types shared across the DFA Studio workspace.
//!
//! Everything here is plain data: identifiers, state/transition records, and
//! the [`DfaDefinition`] aggregate that the engine crate mutates, validates,
//! simulates, and serializes. No I/O and no mutation rules live at this
//! layer - the query helpers on [`DfaDefinition`] are read-only.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier for states within a [`DfaDefinition`].
///
/// Ids are opaque strings (e.g. `"q0"`), stable for the state's lifetime,
/// serialized as plain JSON strings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(String);

impl StateId {
    /// Create a new state id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier for transitions within a [`DfaDefinition`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(String);

impl TransitionId {
    /// Create a new transition id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransitionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TransitionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// States
// =============================================================================

/// Classification of a state: the product of "is initial" and "is accepting".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateKind {
    /// Plain state with no special role.
    #[default]
    Normal,
    /// The designated start state.
    Initial,
    /// A final/accept state.
    Accepting,
    /// The start state, also accepting.
    InitialAccepting,
}

impl StateKind {
    /// Whether this kind carries the start-state role.
    pub fn is_initial(self) -> bool {
        matches!(self, StateKind::Initial | StateKind::InitialAccepting)
    }

    /// Whether this kind carries the accept role.
    pub fn is_accepting(self) -> bool {
        matches!(self, StateKind::Accepting | StateKind::InitialAccepting)
    }

    /// Strip the start-state role, keeping acceptance.
    pub fn demoted(self) -> Self {
        match self {
            StateKind::Initial => StateKind::Normal,
            StateKind::InitialAccepting => StateKind::Accepting,
            other => other,
        }
    }

    /// Add the start-state role, keeping acceptance.
    pub fn promoted(self) -> Self {
        match self {
            StateKind::Normal => StateKind::Initial,
            StateKind::Accepting => StateKind::InitialAccepting,
            other => other,
        }
    }

    /// Get a display label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            StateKind::Normal => "normal",
            StateKind::Initial => "initial",
            StateKind::Accepting => "accepting",
            StateKind::InitialAccepting => "initial-accepting",
        }
    }
}

/// 2D canvas coordinate. Presentation-only: has no effect on simulation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node of the automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfaState {
    /// Unique identifier, stable for the state's lifetime.
    pub id: StateId,
    /// Short display name, user-editable, not required unique.
    pub label: String,
    /// State classification.
    pub kind: StateKind,
    /// Canvas position.
    pub position: Position,
}

impl DfaState {
    /// Create a state with the given id, using the id as the label.
    pub fn new(id: impl Into<StateId>, kind: StateKind) -> Self {
        let id = id.into();
        Self {
            label: id.as_str().to_string(),
            id,
            kind,
            position: Position::default(),
        }
    }

    /// Set the display label (builder pattern).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the canvas position (builder pattern).
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// A directed, symbol-labeled edge between two states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfaTransition {
    /// Unique identifier.
    pub id: TransitionId,
    /// Source state id.
    pub from: StateId,
    /// Target state id.
    pub to: StateId,
    /// Input symbol, exactly one character.
    pub symbol: char,
}

impl DfaTransition {
    /// Create a new transition.
    pub fn new(
        id: impl Into<TransitionId>,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        symbol: char,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            symbol,
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Document metadata carried alongside the automaton.
///
/// Timestamps are RFC 3339 strings - the interchange format requires string
/// values here, not structured time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfaMetadata {
    /// Display name of the automaton.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last-mutation timestamp, RFC 3339. Refreshed on every mutating
    /// operation of the model.
    pub modified_at: String,
}

impl DfaMetadata {
    /// Create metadata with both timestamps set to now.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_rfc3339();
        Self {
            name: name.into(),
            description: String::new(),
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = now_rfc3339();
    }
}

impl Default for DfaMetadata {
    fn default() -> Self {
        Self::new("Untitled DFA")
    }
}

/// Current UTC time as an RFC 3339 string, the timestamp format of the
/// interchange document.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// =============================================================================
// Definition aggregate
// =============================================================================

/// Alphabet used when none is specified.
pub const DEFAULT_ALPHABET: [char; 2] = ['0', '1'];

/// Complete definition of an automaton - the unit of serialization.
///
/// The collections are id-keyed: insertion order carries no meaning. The
/// alphabet is an ordered set of distinct single-character symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfaDefinition {
    /// All states.
    pub states: Vec<DfaState>,
    /// All transitions.
    pub transitions: Vec<DfaTransition>,
    /// Valid input symbols.
    pub alphabet: Vec<char>,
    /// Document metadata.
    pub metadata: DfaMetadata,
}

impl Default for DfaDefinition {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            alphabet: DEFAULT_ALPHABET.to_vec(),
            metadata: DfaMetadata::default(),
        }
    }
}

impl DfaDefinition {
    /// Create an empty definition with the default alphabet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Look up a state by id.
    pub fn state(&self, id: &StateId) -> Option<&DfaState> {
        self.states.iter().find(|s| &s.id == id)
    }

    /// Look up a transition by id.
    pub fn transition(&self, id: &TransitionId) -> Option<&DfaTransition> {
        self.transitions.iter().find(|t| &t.id == id)
    }

    /// The initial-bearing state, if one exists.
    pub fn initial_state(&self) -> Option<&DfaState> {
        self.states.iter().find(|s| s.kind.is_initial())
    }

    /// All accepting-bearing states.
    pub fn accepting_states(&self) -> Vec<&DfaState> {
        self.states.iter().filter(|s| s.kind.is_accepting()).collect()
    }

    /// Transitions leaving the given state.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a StateId,
    ) -> impl Iterator<Item = &'a DfaTransition> {
        self.transitions.iter().filter(move |t| &t.from == state)
    }

    /// The transition leaving `state` on `symbol`, if any. When duplicates
    /// exist (a non-deterministic edit in progress) the first one wins.
    pub fn transition_for_symbol(&self, state: &StateId, symbol: char) -> Option<&DfaTransition> {
        self.transitions
            .iter()
            .find(|t| &t.from == state && t.symbol == symbol)
    }

    /// Whether the symbol belongs to the current alphabet.
    pub fn has_symbol(&self, symbol: char) -> bool {
        self.alphabet.contains(&symbol)
    }

    /// Alphabet rendered for messages, e.g. `0, 1`.
    pub fn alphabet_display(&self) -> String {
        self.alphabet
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_kind_roles() {
        assert!(StateKind::Initial.is_initial());
        assert!(StateKind::InitialAccepting.is_initial());
        assert!(!StateKind::Accepting.is_initial());

        assert!(StateKind::Accepting.is_accepting());
        assert!(StateKind::InitialAccepting.is_accepting());
        assert!(!StateKind::Initial.is_accepting());
    }

    #[test]
    fn test_state_kind_demotion_keeps_acceptance() {
        assert_eq!(StateKind::Initial.demoted(), StateKind::Normal);
        assert_eq!(StateKind::InitialAccepting.demoted(), StateKind::Accepting);
        assert_eq!(StateKind::Normal.demoted(), StateKind::Normal);
        assert_eq!(StateKind::Accepting.demoted(), StateKind::Accepting);
    }

    #[test]
    fn test_state_kind_promotion_keeps_acceptance() {
        assert_eq!(StateKind::Normal.promoted(), StateKind::Initial);
        assert_eq!(StateKind::Accepting.promoted(), StateKind::InitialAccepting);
        assert_eq!(StateKind::Initial.promoted(), StateKind::Initial);
    }

    #[test]
    fn test_state_kind_wire_names() {
        let json = serde_json::to_string(&StateKind::InitialAccepting).unwrap();
        assert_eq!(json, "\"initial-accepting\"");

        let kind: StateKind = serde_json::from_str("\"accepting\"").unwrap();
        assert_eq!(kind, StateKind::Accepting);
    }

    #[test]
    fn test_metadata_wire_names() {
        let metadata = DfaMetadata::new("test");
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"modifiedAt\""));
    }

    #[test]
    fn test_default_definition() {
        let definition = DfaDefinition::default();
        assert_eq!(definition.alphabet, vec!['0', '1']);
        assert_eq!(definition.state_count(), 0);
        assert_eq!(definition.metadata.name, "Untitled DFA");
        assert_eq!(definition.metadata.created_at, definition.metadata.modified_at);
    }

    #[test]
    fn test_definition_queries() {
        let mut definition = DfaDefinition::default();
        definition
            .states
            .push(DfaState::new("q0", StateKind::InitialAccepting));
        definition.states.push(DfaState::new("q1", StateKind::Normal));
        definition
            .transitions
            .push(DfaTransition::new("t0", "q0", "q1", '1'));

        assert_eq!(
            definition.initial_state().map(|s| s.id.as_str()),
            Some("q0")
        );
        assert_eq!(definition.accepting_states().len(), 1);
        assert_eq!(definition.transitions_from(&StateId::new("q0")).count(), 1);
        assert!(definition
            .transition_for_symbol(&StateId::new("q0"), '1')
            .is_some());
        assert!(definition
            .transition_for_symbol(&StateId::new("q0"), '0')
            .is_none());
        assert!(definition.has_symbol('0'));
        assert!(!definition.has_symbol('2'));
        assert_eq!(definition.alphabet_display(), "0, 1");
    }

    #[test]
    fn test_duplicate_transition_first_wins() {
        let mut definition = DfaDefinition::default();
        definition.states.push(DfaState::new("q0", StateKind::Initial));
        definition
            .transitions
            .push(DfaTransition::new("t0", "q0", "q0", '0'));
        definition
            .transitions
            .push(DfaTransition::new("t1", "q0", "q0", '0'));

        let hit = definition
            .transition_for_symbol(&StateId::new("q0"), '0')
            .unwrap();
        assert_eq!(hit.id.as_str(), "t0");
    }
}
