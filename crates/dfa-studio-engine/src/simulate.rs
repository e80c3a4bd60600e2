//! Step simulation of input strings against a definition snapshot.
//!
//! [`execute`] is a pure function from `(definition, input)` to an
//! [`ExecutionTrace`]: an ordered, replayable record of every state visited
//! and symbol consumed. Failures (no initial state, out-of-alphabet input,
//! stuck state) are reported on the trace's `error` field, never as `Err` -
//! the automaton being simulated may well be mid-edit and broken.
//!
//! Traces are immutable once produced. Replaying or stepping backward never
//! recomputes anything; the playback controller just moves a cursor.

use dfa_studio_core::{DfaDefinition, StateId, TransitionId};
use serde::{Deserialize, Serialize};

/// One step of an execution. Step 0 records the initial state before any
/// symbol is consumed, so its `consumed_symbol` and `transition_used` are
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// 0-based step number.
    pub step_number: usize,
    /// State the machine is in after this step.
    pub current_state: StateId,
    /// Unprocessed input suffix.
    pub remaining_input: String,
    /// Symbol consumed by this step.
    pub consumed_symbol: Option<char>,
    /// Transition taken by this step.
    pub transition_used: Option<TransitionId>,
}

/// Full record of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTrace {
    /// Whether the input was accepted.
    pub accepted: bool,
    /// Steps in order, starting at step 0. Partial when the run got stuck.
    pub steps: Vec<ExecutionStep>,
    /// State the run ended in, if it started at all.
    pub final_state: Option<StateId>,
    /// What went wrong, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionTrace {
    /// Whether the run failed before or during consumption.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn rejected_before_start(error: String) -> Self {
        Self {
            accepted: false,
            steps: Vec::new(),
            final_state: None,
            error: Some(error),
        }
    }
}

/// Replay `input` against the definition.
///
/// The whole input is checked against the alphabet up front: an
/// out-of-alphabet character fails the run with zero steps. A missing
/// transition mid-run keeps the steps produced so far (useful for
/// diagnostics) and names the stuck state and symbol in the error.
pub fn execute(definition: &DfaDefinition, input: &str) -> ExecutionTrace {
    let Some(initial) = definition.initial_state() else {
        return ExecutionTrace::rejected_before_start("no initial state defined".to_string());
    };

    for symbol in input.chars() {
        if !definition.has_symbol(symbol) {
            return ExecutionTrace::rejected_before_start(format!(
                "invalid symbol '{symbol}' not in alphabet {{{}}}",
                definition.alphabet_display()
            ));
        }
    }

    let mut steps = vec![ExecutionStep {
        step_number: 0,
        current_state: initial.id.clone(),
        remaining_input: input.to_string(),
        consumed_symbol: None,
        transition_used: None,
    }];
    let mut current = initial;

    for (index, (offset, symbol)) in input.char_indices().enumerate() {
        let Some(transition) = definition.transition_for_symbol(&current.id, symbol) else {
            return ExecutionTrace {
                accepted: false,
                steps,
                final_state: Some(current.id.clone()),
                error: Some(format!(
                    "no transition from state \"{}\" for symbol '{symbol}'",
                    current.label
                )),
            };
        };

        // Dangling targets cannot come out of the model's own mutators, but
        // the trace must hold up against externally built definitions.
        let Some(next) = definition.state(&transition.to) else {
            return ExecutionTrace {
                accepted: false,
                steps,
                final_state: Some(current.id.clone()),
                error: Some(format!(
                    "transition {} targets unknown state {}",
                    transition.id, transition.to
                )),
            };
        };

        steps.push(ExecutionStep {
            step_number: index + 1,
            current_state: next.id.clone(),
            remaining_input: input[offset + symbol.len_utf8()..].to_string(),
            consumed_symbol: Some(symbol),
            transition_used: Some(transition.id.clone()),
        });
        current = next;
    }

    ExecutionTrace {
        accepted: current.kind.is_accepting(),
        steps,
        final_state: Some(current.id.clone()),
        error: None,
    }
}

/// Replay `input` and truncate the trace after `target_step`.
///
/// Acceptance for the truncated view requires the whole input to have been
/// consumed, not just an accepting current state: a run can pass through an
/// accepting state mid-string without being "accepted" at that point.
pub fn execute_up_to_step(
    definition: &DfaDefinition,
    input: &str,
    target_step: usize,
) -> ExecutionTrace {
    let full = execute(definition, input);
    if full.error.is_some() {
        return full;
    }

    let end = (target_step + 1).min(full.steps.len());
    let steps: Vec<ExecutionStep> = full.steps[..end].to_vec();

    let accepted = steps
        .last()
        .map(|last| {
            last.remaining_input.is_empty()
                && definition
                    .state(&last.current_state)
                    .is_some_and(|s| s.kind.is_accepting())
        })
        .unwrap_or(false);
    let final_state = steps.last().map(|s| s.current_state.clone());

    ExecutionTrace {
        accepted,
        steps,
        final_state,
        error: None,
    }
}

/// Whether the definition accepts `input`.
pub fn accepts(definition: &DfaDefinition, input: &str) -> bool {
    execute(definition, input).accepted
}

/// Number of steps a complete run over `input` produces: step 0 plus one
/// per character.
pub fn step_count(input: &str) -> usize {
    input.chars().count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfa_studio_core::{DfaState, DfaTransition, StateKind};

    /// q0 (initial, accepting) and q1 toggled by '1', nothing wired for '0'.
    fn toggle_machine() -> DfaDefinition {
        DfaDefinition {
            states: vec![
                DfaState::new("q0", StateKind::InitialAccepting),
                DfaState::new("q1", StateKind::Normal),
            ],
            transitions: vec![
                DfaTransition::new("t0", "q0", "q1", '1'),
                DfaTransition::new("t1", "q1", "q0", '1'),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_accepted_by_accepting_initial() {
        let trace = execute(&toggle_machine(), "");

        assert!(trace.accepted);
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.steps[0].step_number, 0);
        assert_eq!(trace.steps[0].consumed_symbol, None);
        assert_eq!(trace.steps[0].transition_used, None);
        assert_eq!(trace.final_state, Some(StateId::new("q0")));
        assert!(!trace.is_error());
    }

    #[test]
    fn test_round_trip_through_both_states() {
        let trace = execute(&toggle_machine(), "11");

        assert!(trace.accepted);
        assert_eq!(trace.steps.len(), 3);

        let visited: Vec<&str> = trace
            .steps
            .iter()
            .map(|s| s.current_state.as_str())
            .collect();
        assert_eq!(visited, vec!["q0", "q1", "q0"]);

        assert_eq!(trace.steps[1].remaining_input, "1");
        assert_eq!(trace.steps[2].remaining_input, "");
        assert_eq!(trace.steps[1].consumed_symbol, Some('1'));
        assert_eq!(trace.steps[1].transition_used, Some(TransitionId::new("t0")));
    }

    #[test]
    fn test_stuck_state_keeps_partial_trace() {
        // '0' is in the alphabet but q0 has no transition for it.
        let trace = execute(&toggle_machine(), "0");

        assert!(!trace.accepted);
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.final_state, Some(StateId::new("q0")));
        let error = trace.error.unwrap();
        assert!(error.contains("q0"));
        assert!(error.contains("'0'"));
    }

    #[test]
    fn test_invalid_symbol_short_circuits_with_zero_steps() {
        let trace = execute(&toggle_machine(), "2");

        assert!(!trace.accepted);
        assert!(trace.steps.is_empty());
        assert_eq!(trace.final_state, None);
        let error = trace.error.unwrap();
        assert!(error.contains("'2'"));
        assert!(error.contains("0, 1"));
    }

    #[test]
    fn test_invalid_symbol_later_in_input_still_zero_steps() {
        // Validation happens up front, before step 0 is emitted.
        let trace = execute(&toggle_machine(), "1x1");
        assert!(trace.steps.is_empty());
        assert!(trace.error.unwrap().contains("'x'"));
    }

    #[test]
    fn test_no_initial_state() {
        let mut definition = toggle_machine();
        definition.states[0].kind = StateKind::Accepting;

        let trace = execute(&definition, "1");
        assert!(!trace.accepted);
        assert!(trace.steps.is_empty());
        assert_eq!(trace.final_state, None);
        assert!(trace.error.unwrap().contains("initial"));
    }

    #[test]
    fn test_dangling_transition_target() {
        // Only constructible by bypassing the model's mutators.
        let mut definition = toggle_machine();
        definition.transitions[0].to = StateId::new("ghost");

        let trace = execute(&definition, "1");
        assert!(!trace.accepted);
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.final_state, Some(StateId::new("q0")));
        assert!(trace.error.unwrap().contains("ghost"));
    }

    #[test]
    fn test_execution_is_deterministic() {
        let definition = toggle_machine();
        assert_eq!(execute(&definition, "1111"), execute(&definition, "1111"));
    }

    #[test]
    fn test_up_to_step_mid_string_accepting_state_not_accepted() {
        // After "11" the run is back in accepting q0 at step 2, but input
        // remains at that point in "1111".
        let definition = toggle_machine();
        let partial = execute_up_to_step(&definition, "1111", 2);

        assert_eq!(partial.steps.len(), 3);
        assert_eq!(partial.final_state, Some(StateId::new("q0")));
        assert!(!partial.accepted);
    }

    #[test]
    fn test_up_to_step_full_length_matches_execute() {
        let definition = toggle_machine();
        let full = execute(&definition, "11");
        let partial = execute_up_to_step(&definition, "11", 2);

        assert_eq!(partial.steps, full.steps);
        assert_eq!(partial.accepted, full.accepted);
    }

    #[test]
    fn test_up_to_step_clamps_past_the_end() {
        let definition = toggle_machine();
        let partial = execute_up_to_step(&definition, "11", 99);
        assert_eq!(partial.steps.len(), 3);
        assert!(partial.accepted);
    }

    #[test]
    fn test_up_to_step_propagates_errors_unchanged() {
        let definition = toggle_machine();
        let partial = execute_up_to_step(&definition, "2", 0);
        assert!(partial.steps.is_empty());
        assert!(partial.is_error());
    }

    #[test]
    fn test_accepts_and_step_count() {
        let definition = toggle_machine();
        assert!(accepts(&definition, ""));
        assert!(accepts(&definition, "11"));
        assert!(!accepts(&definition, "1"));

        assert_eq!(step_count(""), 1);
        assert_eq!(step_count("1011"), 5);
    }
}
