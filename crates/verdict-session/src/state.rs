use serde::{Deserialize, Serialize};

/// The states a session moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    LoadPersona,
    ValidateInput,
    Inference,
    GovernanceCheck,
    Output,
    Halt,
}

impl SessionState {
    /// The guarded transition table. `Halt` is reachable from every
    /// non-terminal state; `Idle` is the only re-entrant state.
    pub fn may_transition(self, to: SessionState) -> bool {
        use SessionState::*;
        match (self, to) {
            (Idle, ValidateInput) => true,
            (Idle, LoadPersona) => true,
            (LoadPersona, Idle) => true,
            (ValidateInput, Inference) => true,
            (Inference, GovernanceCheck) => true,
            (GovernanceCheck, Output) => true,
            (Output, Idle) => true,
            (from, Halt) => from != Halt,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Halt
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::LoadPersona => "LOAD_PERSONA",
            Self::ValidateInput => "VALIDATE_INPUT",
            Self::Inference => "INFERENCE",
            Self::GovernanceCheck => "GOVERNANCE_CHECK",
            Self::Output => "OUTPUT",
            Self::Halt => "HALT",
        };
        write!(f, "{name}")
    }
}

/// The structured cause carried by every transition into `Halt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltCause {
    LoadFailure,
    ConstraintViolation,
    NoSolution,
    Ambiguity,
    Contradiction,
    DepthExceeded,
    GovernanceRejection,
}

impl std::fmt::Display for HaltCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoadFailure => "load-failure",
            Self::ConstraintViolation => "constraint-violation",
            Self::NoSolution => "no-solution",
            Self::Ambiguity => "ambiguity",
            Self::Contradiction => "contradiction",
            Self::DepthExceeded => "depth-exceeded",
            Self::GovernanceRejection => "governance-rejection",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let path = [Idle, ValidateInput, Inference, GovernanceCheck, Output, Idle];
        for pair in path.windows(2) {
            assert!(pair[0].may_transition(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn halt_reachable_from_every_non_terminal_state() {
        for from in [Idle, LoadPersona, ValidateInput, Inference, GovernanceCheck, Output] {
            assert!(from.may_transition(Halt));
        }
    }

    #[test]
    fn halt_is_terminal() {
        for to in [Idle, LoadPersona, ValidateInput, Inference, GovernanceCheck, Output, Halt] {
            assert!(!Halt.may_transition(to));
        }
    }

    #[test]
    fn states_cannot_be_skipped() {
        assert!(!Idle.may_transition(Inference));
        assert!(!Idle.may_transition(GovernanceCheck));
        assert!(!Idle.may_transition(Output));
        assert!(!ValidateInput.may_transition(GovernanceCheck));
        assert!(!Inference.may_transition(Output));
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!Inference.may_transition(ValidateInput));
        assert!(!GovernanceCheck.may_transition(Inference));
        assert!(!Output.may_transition(GovernanceCheck));
    }
}
