//! Structural validation of a definition snapshot.
//!
//! [`validate`] is a pure function: six independent passes, all run on every
//! call, with findings reported as data. Errors break the automaton (a host
//! should block "run" on them); warnings are quality issues that never
//! block anything. Findings from different passes never suppress each
//! other.

use std::collections::{HashSet, VecDeque};

use dfa_studio_core::{DfaDefinition, StateId, TransitionId};
use serde::{Deserialize, Serialize};

/// Kinds of automaton-breaking findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// No state carries the start role.
    NoInitialState,
    /// More than one state carries the start role. Unreachable through the
    /// model's own mutators, but loaded or hand-edited data may have it.
    MultipleInitialStates,
    /// A state has more than one outgoing transition for the same symbol.
    NonDeterministic,
    /// A transition uses a symbol outside the current alphabet.
    InvalidSymbol,
}

/// Kinds of non-fatal quality findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationWarningKind {
    /// No state carries the accept role; the automaton rejects everything.
    NoAcceptingState,
    /// A state is missing an outgoing transition for an alphabet symbol.
    IncompleteTransitions,
    /// A state cannot be reached from the initial state.
    UnreachableState,
}

/// An automaton-breaking finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// What went wrong.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the state label or symbol involved.
    pub message: String,
    /// The state this finding refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
    /// The transition this finding refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_id: Option<TransitionId>,
}

/// A non-fatal quality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// What is questionable.
    pub kind: ValidationWarningKind,
    /// Human-readable description.
    pub message: String,
    /// The state this finding refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
}

/// Result of one validation run. Recomputed on demand, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Automaton-breaking findings, in pass order.
    pub errors: Vec<ValidationError>,
    /// Quality findings, in pass order.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// `true` iff there are no errors. Warnings never affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors of a given kind.
    pub fn errors_of_kind(&self, kind: ValidationErrorKind) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.kind == kind).collect()
    }

    /// Warnings of a given kind.
    pub fn warnings_of_kind(&self, kind: ValidationWarningKind) -> Vec<&ValidationWarning> {
        self.warnings.iter().filter(|w| w.kind == kind).collect()
    }
}

/// Validate a definition snapshot.
pub fn validate(definition: &DfaDefinition) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_initial_state(definition, &mut errors);
    check_accepting_states(definition, &mut warnings);
    check_determinism(definition, &mut errors);
    check_completeness(definition, &mut warnings);
    check_reachability(definition, &mut warnings);
    check_symbols(definition, &mut errors);

    ValidationResult { errors, warnings }
}

/// States reachable from `start` by following transitions forward. Symbols
/// are ignored here: edges count only for connectivity.
pub fn reachable_states(definition: &DfaDefinition, start: &StateId) -> HashSet<StateId> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(current) = queue.pop_front() {
        if !reachable.insert(current.clone()) {
            continue;
        }
        for transition in definition.transitions_from(&current) {
            if !reachable.contains(&transition.to) {
                queue.push_back(transition.to.clone());
            }
        }
    }

    reachable
}

fn check_initial_state(definition: &DfaDefinition, errors: &mut Vec<ValidationError>) {
    let count = definition
        .states
        .iter()
        .filter(|s| s.kind.is_initial())
        .count();

    if count == 0 {
        errors.push(ValidationError {
            kind: ValidationErrorKind::NoInitialState,
            message: "the automaton must have exactly one initial state".to_string(),
            state_id: None,
            transition_id: None,
        });
    } else if count > 1 {
        errors.push(ValidationError {
            kind: ValidationErrorKind::MultipleInitialStates,
            message: format!("the automaton has {count} initial states; exactly one is required"),
            state_id: None,
            transition_id: None,
        });
    }
}

fn check_accepting_states(definition: &DfaDefinition, warnings: &mut Vec<ValidationWarning>) {
    if definition.states.iter().any(|s| s.kind.is_accepting()) {
        return;
    }
    warnings.push(ValidationWarning {
        kind: ValidationWarningKind::NoAcceptingState,
        message: "the automaton has no accepting states and will reject every input".to_string(),
        state_id: None,
    });
}

fn check_determinism(definition: &DfaDefinition, errors: &mut Vec<ValidationError>) {
    for state in &definition.states {
        // First-occurrence order keeps messages deterministic.
        let mut counts: Vec<(char, usize)> = Vec::new();
        for transition in definition.transitions_from(&state.id) {
            match counts.iter_mut().find(|(s, _)| *s == transition.symbol) {
                Some((_, count)) => *count += 1,
                None => counts.push((transition.symbol, 1)),
            }
        }

        let duplicated: Vec<String> = counts
            .iter()
            .filter(|(_, count)| *count > 1)
            .map(|(symbol, count)| format!("{count} transitions for symbol '{symbol}'"))
            .collect();

        // One error per offending state, however many duplicates it has.
        if !duplicated.is_empty() {
            errors.push(ValidationError {
                kind: ValidationErrorKind::NonDeterministic,
                message: format!(
                    "state \"{}\" has {}; a DFA allows at most one per symbol",
                    state.label,
                    duplicated.join(", ")
                ),
                state_id: Some(state.id.clone()),
                transition_id: None,
            });
        }
    }
}

fn check_completeness(definition: &DfaDefinition, warnings: &mut Vec<ValidationWarning>) {
    for state in &definition.states {
        let covered: HashSet<char> = definition
            .transitions_from(&state.id)
            .map(|t| t.symbol)
            .collect();

        for &symbol in &definition.alphabet {
            if !covered.contains(&symbol) {
                warnings.push(ValidationWarning {
                    kind: ValidationWarningKind::IncompleteTransitions,
                    message: format!(
                        "state \"{}\" has no transition for symbol '{symbol}'",
                        state.label
                    ),
                    state_id: Some(state.id.clone()),
                });
            }
        }
    }
}

fn check_reachability(definition: &DfaDefinition, warnings: &mut Vec<ValidationWarning>) {
    // Without an initial state there is nothing to flood from; the missing
    // initial is already an error from the first pass.
    let Some(initial) = definition.initial_state() else {
        return;
    };

    let reachable = reachable_states(definition, &initial.id);
    for state in &definition.states {
        if !reachable.contains(&state.id) {
            warnings.push(ValidationWarning {
                kind: ValidationWarningKind::UnreachableState,
                message: format!(
                    "state \"{}\" is not reachable from the initial state",
                    state.label
                ),
                state_id: Some(state.id.clone()),
            });
        }
    }
}

fn check_symbols(definition: &DfaDefinition, errors: &mut Vec<ValidationError>) {
    for transition in &definition.transitions {
        if !definition.has_symbol(transition.symbol) {
            errors.push(ValidationError {
                kind: ValidationErrorKind::InvalidSymbol,
                message: format!(
                    "transition uses symbol '{}' which is not in the alphabet {{{}}}",
                    transition.symbol,
                    definition.alphabet_display()
                ),
                state_id: None,
                transition_id: Some(transition.id.clone()),
            });
        }
    }
}
