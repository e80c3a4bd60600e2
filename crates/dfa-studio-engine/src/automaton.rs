//! The automaton model: CRUD over states, transitions, alphabet, metadata.
//!
//! `Dfa` owns the live definition and enforces the write-time invariants:
//! at most one initial-bearing state (promoting a state demotes the previous
//! holder in the same call), transition endpoints and symbols checked on
//! insert, cascade deletes when a state is removed. Determinism is NOT
//! enforced here - duplicate `(from, symbol)` pairs are admitted so a host
//! can keep editing a temporarily-invalid graph; the validator flags them.
//!
//! Every successful mutation refreshes `metadata.modified_at`. A failed
//! mutation returns a typed error before touching any field.

use dfa_studio_core::{
    DfaDefinition, DfaMetadata, DfaState, DfaTransition, Position, StateId, StateKind,
    TransitionId,
};
use tracing::{debug, info};

use crate::error::{DfaError, DfaResult};

/// Partial update for a state. `None` fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct StateUpdate {
    pub label: Option<String>,
    pub kind: Option<StateKind>,
    pub position: Option<Position>,
}

impl StateUpdate {
    /// Update only the kind.
    pub fn kind(kind: StateKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Update only the label.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Update only the position.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position: Some(Position::new(x, y)),
            ..Default::default()
        }
    }
}

/// Partial update for a transition. `None` fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct TransitionUpdate {
    pub from: Option<StateId>,
    pub to: Option<StateId>,
    pub symbol: Option<char>,
}

impl TransitionUpdate {
    /// Update only the symbol.
    pub fn symbol(symbol: char) -> Self {
        Self {
            symbol: Some(symbol),
            ..Default::default()
        }
    }
}

/// Partial update for document metadata.
#[derive(Debug, Default, Clone)]
pub struct MetadataUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The automaton model.
///
/// Construct one per document; the instance is owned by the caller (there is
/// no process-wide singleton), so independent automatons can coexist in one
/// process. Operations are synchronous and not internally synchronized - a
/// concurrent host needs its own single-writer discipline.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    definition: DfaDefinition,
}

impl Dfa {
    /// Create an empty automaton with the default alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an automaton from an existing definition (e.g. a decoded file).
    pub fn from_definition(definition: DfaDefinition) -> Self {
        Self { definition }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Borrow the live definition for cheap reads.
    pub fn definition(&self) -> &DfaDefinition {
        &self.definition
    }

    /// Owned deep snapshot of the definition. Mutating the returned value
    /// never affects the live model.
    pub fn get_definition(&self) -> DfaDefinition {
        self.definition.clone()
    }

    /// Wholesale replace the definition. Invariants are not re-checked here
    /// (the codec's schema pass vouches for loaded documents); callers
    /// should re-run the validator afterwards for display.
    pub fn load_definition(&mut self, definition: DfaDefinition) {
        info!(
            states = definition.state_count(),
            transitions = definition.transition_count(),
            "definition_loaded"
        );
        self.definition = definition;
    }

    /// Drop all states and transitions, keeping alphabet and metadata.
    pub fn clear(&mut self) {
        self.definition.states.clear();
        self.definition.transitions.clear();
        self.touch();
        info!("definition_cleared");
    }

    // =========================================================================
    // State operations
    // =========================================================================

    /// Insert a state. If the new state is initial-bearing, the previous
    /// initial holder is demoted in the same call, so there is never a
    /// window with two initial states.
    pub fn add_state(&mut self, state: DfaState) {
        if state.kind.is_initial() {
            self.demote_initial_states();
        }
        debug!(state = %state.id, kind = state.kind.label(), "state_added");
        self.definition.states.push(state);
        self.touch();
    }

    /// Remove a state and cascade: every transition touching it goes too.
    /// Removing an unknown id is a quiet no-op that returns `false` and
    /// leaves `modified_at` untouched.
    pub fn remove_state(&mut self, id: &StateId) -> bool {
        let before = self.definition.states.len();
        self.definition.states.retain(|s| &s.id != id);
        if self.definition.states.len() == before {
            return false;
        }
        self.definition
            .transitions
            .retain(|t| &t.from != id && &t.to != id);
        debug!(state = %id, "state_removed");
        self.touch();
        true
    }

    /// Merge partial fields into a state. A merge that changes the kind to
    /// an initial-bearing kind demotes the previous holder atomically.
    pub fn update_state(&mut self, id: &StateId, update: StateUpdate) -> DfaResult<()> {
        let index = self
            .definition
            .states
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| DfaError::NotFound { id: id.to_string() })?;

        let old_kind = self.definition.states[index].kind;
        let new_kind = update.kind.unwrap_or(old_kind);
        if new_kind.is_initial() && new_kind != old_kind {
            // Demotes the updated state too; its kind is overwritten below.
            self.demote_initial_states();
        }

        let state = &mut self.definition.states[index];
        if let Some(label) = update.label {
            state.label = label;
        }
        state.kind = new_kind;
        if let Some(position) = update.position {
            state.position = position;
        }
        self.touch();
        Ok(())
    }

    // =========================================================================
    // Transition operations
    // =========================================================================

    /// Insert a transition. Both endpoints must exist and the symbol must be
    /// in the current alphabet. Duplicate `(from, symbol)` pairs are NOT
    /// rejected - the validator reports them as non-determinism.
    pub fn add_transition(&mut self, transition: DfaTransition) -> DfaResult<()> {
        if self.definition.state(&transition.from).is_none() {
            return Err(DfaError::UnknownState {
                id: transition.from,
            });
        }
        if self.definition.state(&transition.to).is_none() {
            return Err(DfaError::UnknownState { id: transition.to });
        }
        if !self.definition.has_symbol(transition.symbol) {
            return Err(self.symbol_error(transition.symbol));
        }
        debug!(
            transition = %transition.id,
            from = %transition.from,
            to = %transition.to,
            symbol = %transition.symbol,
            "transition_added"
        );
        self.definition.transitions.push(transition);
        self.touch();
        Ok(())
    }

    /// Remove a transition. Same unknown-id policy as [`Dfa::remove_state`].
    pub fn remove_transition(&mut self, id: &TransitionId) -> bool {
        let before = self.definition.transitions.len();
        self.definition.transitions.retain(|t| &t.id != id);
        if self.definition.transitions.len() == before {
            return false;
        }
        debug!(transition = %id, "transition_removed");
        self.touch();
        true
    }

    /// Merge partial fields into a transition. A changed symbol must be in
    /// the current alphabet; endpoint changes are not re-checked against the
    /// state set.
    pub fn update_transition(
        &mut self,
        id: &TransitionId,
        update: TransitionUpdate,
    ) -> DfaResult<()> {
        let index = self
            .definition
            .transitions
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| DfaError::NotFound { id: id.to_string() })?;

        if let Some(symbol) = update.symbol {
            if !self.definition.has_symbol(symbol) {
                return Err(self.symbol_error(symbol));
            }
        }

        let transition = &mut self.definition.transitions[index];
        if let Some(from) = update.from {
            transition.from = from;
        }
        if let Some(to) = update.to {
            transition.to = to;
        }
        if let Some(symbol) = update.symbol {
            transition.symbol = symbol;
        }
        self.touch();
        Ok(())
    }

    // =========================================================================
    // Alphabet and metadata
    // =========================================================================

    /// Replace the alphabet. Every entry must be exactly one character;
    /// duplicates collapse quietly, first occurrence order preserved.
    ///
    /// Transitions whose symbol falls outside the new alphabet are left in
    /// place - the inconsistency surfaces through the validator, not through
    /// an eager cascade.
    pub fn set_alphabet<I, S>(&mut self, symbols: I) -> DfaResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        if entries.is_empty() {
            return Err(DfaError::EmptyAlphabet);
        }

        let mut alphabet: Vec<char> = Vec::with_capacity(entries.len());
        for entry in &entries {
            let mut chars = entry.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(DfaError::MultiCharSymbol {
                        symbol: entry.clone(),
                    })
                }
            };
            if !alphabet.contains(&symbol) {
                alphabet.push(symbol);
            }
        }

        debug!(alphabet = %alphabet.iter().collect::<String>(), "alphabet_set");
        self.definition.alphabet = alphabet;
        self.touch();
        Ok(())
    }

    /// Merge partial name/description fields into the metadata.
    pub fn update_metadata(&mut self, update: MetadataUpdate) {
        if let Some(name) = update.name {
            self.definition.metadata.name = name;
        }
        if let Some(description) = update.description {
            self.definition.metadata.description = description;
        }
        self.touch();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All states.
    pub fn states(&self) -> &[DfaState] {
        &self.definition.states
    }

    /// All transitions.
    pub fn transitions(&self) -> &[DfaTransition] {
        &self.definition.transitions
    }

    /// The current alphabet.
    pub fn alphabet(&self) -> &[char] {
        &self.definition.alphabet
    }

    /// Document metadata.
    pub fn metadata(&self) -> &DfaMetadata {
        &self.definition.metadata
    }

    /// Look up a state by id.
    pub fn state(&self, id: &StateId) -> Option<&DfaState> {
        self.definition.state(id)
    }

    /// Look up a transition by id.
    pub fn transition(&self, id: &TransitionId) -> Option<&DfaTransition> {
        self.definition.transition(id)
    }

    /// The initial-bearing state, if one exists.
    pub fn initial_state(&self) -> Option<&DfaState> {
        self.definition.initial_state()
    }

    /// All accepting-bearing states.
    pub fn accepting_states(&self) -> Vec<&DfaState> {
        self.definition.accepting_states()
    }

    /// A state id of the form `q<n>` unused by the current definition.
    pub fn next_state_id(&self) -> StateId {
        let mut n = self.definition.state_count();
        loop {
            let candidate = StateId::new(format!("q{n}"));
            if self.definition.state(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// A transition id of the form `t<n>` unused by the current definition.
    pub fn next_transition_id(&self) -> TransitionId {
        let mut n = self.definition.transition_count();
        loop {
            let candidate = TransitionId::new(format!("t{n}"));
            if self.definition.transition(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    // Internal helpers

    fn demote_initial_states(&mut self) {
        for state in &mut self.definition.states {
            state.kind = state.kind.demoted();
        }
    }

    fn symbol_error(&self, symbol: char) -> DfaError {
        DfaError::SymbolNotInAlphabet {
            symbol,
            alphabet: self.definition.alphabet_display(),
        }
    }

    fn touch(&mut self) {
        self.definition.metadata.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfa_studio_core::StateKind;

    fn two_state_dfa() -> Dfa {
        let mut dfa = Dfa::new();
        dfa.add_state(DfaState::new("q0", StateKind::Initial));
        dfa.add_state(DfaState::new("q1", StateKind::Accepting));
        dfa
    }

    #[test]
    fn test_add_state_demotes_previous_initial() {
        let mut dfa = Dfa::new();
        dfa.add_state(DfaState::new("q0", StateKind::InitialAccepting));
        dfa.add_state(DfaState::new("q1", StateKind::Initial));

        let q0 = dfa.state(&StateId::new("q0")).unwrap();
        // Acceptance survives the demotion.
        assert_eq!(q0.kind, StateKind::Accepting);

        let initials: Vec<_> = dfa.states().iter().filter(|s| s.kind.is_initial()).collect();
        assert_eq!(initials.len(), 1);
        assert_eq!(initials[0].id.as_str(), "q1");
    }

    #[test]
    fn test_update_state_demotes_previous_initial() {
        let mut dfa = two_state_dfa();
        dfa.update_state(&StateId::new("q1"), StateUpdate::kind(StateKind::InitialAccepting))
            .unwrap();

        assert_eq!(dfa.state(&StateId::new("q0")).unwrap().kind, StateKind::Normal);
        assert_eq!(
            dfa.state(&StateId::new("q1")).unwrap().kind,
            StateKind::InitialAccepting
        );
    }

    #[test]
    fn test_single_initial_after_many_mutations() {
        let mut dfa = Dfa::new();
        for i in 0..5 {
            dfa.add_state(DfaState::new(format!("q{i}"), StateKind::Initial));
        }
        for i in 0..5 {
            dfa.update_state(&StateId::new(format!("q{i}")), StateUpdate::kind(StateKind::Initial))
                .unwrap();
        }

        let initials = dfa.states().iter().filter(|s| s.kind.is_initial()).count();
        assert_eq!(initials, 1);
    }

    #[test]
    fn test_update_state_same_kind_does_not_demote_self() {
        let mut dfa = two_state_dfa();
        // Re-asserting the current kind while renaming must not disturb it.
        dfa.update_state(
            &StateId::new("q0"),
            StateUpdate {
                label: Some("start".to_string()),
                kind: Some(StateKind::Initial),
                position: None,
            },
        )
        .unwrap();

        let q0 = dfa.state(&StateId::new("q0")).unwrap();
        assert_eq!(q0.kind, StateKind::Initial);
        assert_eq!(q0.label, "start");
    }

    #[test]
    fn test_remove_state_cascades_transitions() {
        let mut dfa = two_state_dfa();
        dfa.add_transition(DfaTransition::new("t0", "q0", "q1", '0'))
            .unwrap();
        dfa.add_transition(DfaTransition::new("t1", "q1", "q0", '1'))
            .unwrap();
        dfa.add_transition(DfaTransition::new("t2", "q0", "q0", '1'))
            .unwrap();

        assert!(dfa.remove_state(&StateId::new("q1")));

        assert_eq!(dfa.states().len(), 1);
        // Only the q0 self-loop survives.
        assert_eq!(dfa.transitions().len(), 1);
        assert_eq!(dfa.transitions()[0].id.as_str(), "t2");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut dfa = two_state_dfa();
        let stamp = dfa.metadata().modified_at.clone();

        assert!(!dfa.remove_state(&StateId::new("missing")));
        assert!(!dfa.remove_transition(&TransitionId::new("missing")));
        assert_eq!(dfa.states().len(), 2);
        assert_eq!(dfa.metadata().modified_at, stamp);
    }

    #[test]
    fn test_update_state_not_found() {
        let mut dfa = Dfa::new();
        let err = dfa
            .update_state(&StateId::new("ghost"), StateUpdate::label("x"))
            .unwrap_err();
        assert!(matches!(err, DfaError::NotFound { .. }));
    }

    #[test]
    fn test_add_transition_unknown_state_leaves_model_unchanged() {
        let mut dfa = two_state_dfa();
        let stamp = dfa.metadata().modified_at.clone();

        let err = dfa
            .add_transition(DfaTransition::new("t0", "q0", "ghost", '0'))
            .unwrap_err();
        assert!(matches!(err, DfaError::UnknownState { .. }));
        assert_eq!(dfa.transitions().len(), 0);
        assert_eq!(dfa.metadata().modified_at, stamp);
    }

    #[test]
    fn test_add_transition_symbol_outside_alphabet() {
        let mut dfa = two_state_dfa();
        let err = dfa
            .add_transition(DfaTransition::new("t0", "q0", "q1", 'x'))
            .unwrap_err();
        assert!(matches!(err, DfaError::SymbolNotInAlphabet { symbol: 'x', .. }));
        assert_eq!(dfa.transitions().len(), 0);
    }

    #[test]
    fn test_add_transition_admits_duplicates() {
        let mut dfa = two_state_dfa();
        dfa.add_transition(DfaTransition::new("t0", "q0", "q0", '0'))
            .unwrap();
        // Same (from, symbol) pair: admitted, flagged later by the validator.
        dfa.add_transition(DfaTransition::new("t1", "q0", "q1", '0'))
            .unwrap();
        assert_eq!(dfa.transitions().len(), 2);
    }

    #[test]
    fn test_update_transition_symbol_checked() {
        let mut dfa = two_state_dfa();
        dfa.add_transition(DfaTransition::new("t0", "q0", "q1", '0'))
            .unwrap();

        let err = dfa
            .update_transition(&TransitionId::new("t0"), TransitionUpdate::symbol('z'))
            .unwrap_err();
        assert!(matches!(err, DfaError::SymbolNotInAlphabet { .. }));
        assert_eq!(dfa.transitions()[0].symbol, '0');

        dfa.update_transition(&TransitionId::new("t0"), TransitionUpdate::symbol('1'))
            .unwrap();
        assert_eq!(dfa.transitions()[0].symbol, '1');
    }

    #[test]
    fn test_set_alphabet_dedups_preserving_order() {
        let mut dfa = Dfa::new();
        dfa.set_alphabet(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(dfa.alphabet(), &['b', 'a', 'c']);
    }

    #[test]
    fn test_set_alphabet_rejects_empty_and_multichar() {
        let mut dfa = Dfa::new();
        let err = dfa.set_alphabet(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DfaError::EmptyAlphabet));

        let err = dfa.set_alphabet(["0", "ab"]).unwrap_err();
        assert!(matches!(err, DfaError::MultiCharSymbol { .. }));
        // Failed call left the default alphabet in place.
        assert_eq!(dfa.alphabet(), &['0', '1']);
    }

    #[test]
    fn test_set_alphabet_does_not_cascade_transitions() {
        let mut dfa = two_state_dfa();
        dfa.set_alphabet(["a", "b"]).unwrap();
        dfa.add_transition(DfaTransition::new("t0", "q0", "q1", 'a'))
            .unwrap();

        // Shrinking the alphabet orphans t0's symbol but keeps the transition.
        dfa.set_alphabet(["b"]).unwrap();
        assert_eq!(dfa.transitions().len(), 1);
        assert_eq!(dfa.transitions()[0].symbol, 'a');
    }

    #[test]
    fn test_get_definition_is_a_defensive_copy() {
        let dfa = two_state_dfa();
        let mut snapshot = dfa.get_definition();
        snapshot.states.clear();
        snapshot.alphabet.clear();

        assert_eq!(dfa.states().len(), 2);
        assert_eq!(dfa.alphabet(), &['0', '1']);
    }

    #[test]
    fn test_clear_keeps_alphabet_and_metadata() {
        let mut dfa = two_state_dfa();
        dfa.set_alphabet(["a", "b"]).unwrap();
        dfa.update_metadata(MetadataUpdate {
            name: Some("parity".to_string()),
            description: None,
        });
        dfa.clear();

        assert_eq!(dfa.states().len(), 0);
        assert_eq!(dfa.transitions().len(), 0);
        assert_eq!(dfa.alphabet(), &['a', 'b']);
        assert_eq!(dfa.metadata().name, "parity");
    }

    #[test]
    fn test_next_ids_skip_taken() {
        let mut dfa = Dfa::new();
        assert_eq!(dfa.next_state_id().as_str(), "q0");
        dfa.add_state(DfaState::new("q0", StateKind::Initial));
        dfa.add_state(DfaState::new("q2", StateKind::Normal));
        // Count is 2 and "q2" is taken, so the scan lands on "q3".
        assert_eq!(dfa.next_state_id().as_str(), "q3");
        assert_eq!(dfa.next_transition_id().as_str(), "t0");
    }
}
