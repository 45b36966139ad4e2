// Orchestrator shutdown state machine

use std::fmt;
use tracing::info;

/// Pipeline lifecycle, strictly linear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Starting,
    Producing,
    DrainingWorkers,
    ClosingOutput,
    DrainingSink,
    Done,
}

impl PipelineState {
    /// The only legal successor
    pub fn next(self) -> Option<PipelineState> {
        match self {
            PipelineState::Starting => Some(PipelineState::Producing),
            PipelineState::Producing => Some(PipelineState::DrainingWorkers),
            PipelineState::DrainingWorkers => Some(PipelineState::ClosingOutput),
            PipelineState::ClosingOutput => Some(PipelineState::DrainingSink),
            PipelineState::DrainingSink => Some(PipelineState::Done),
            PipelineState::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PipelineState::Done
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Starting => write!(f, "STARTING"),
            PipelineState::Producing => write!(f, "PRODUCING"),
            PipelineState::DrainingWorkers => write!(f, "DRAINING_WORKERS"),
            PipelineState::ClosingOutput => write!(f, "CLOSING_OUTPUT"),
            PipelineState::DrainingSink => write!(f, "DRAINING_SINK"),
            PipelineState::Done => write!(f, "DONE"),
        }
    }
}

/// Records the states a run passes through
#[derive(Debug)]
pub(crate) struct StateTracker {
    history: Vec<PipelineState>,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            history: vec![PipelineState::Starting],
        }
    }

    pub(crate) fn current(&self) -> PipelineState {
        // history always holds at least Starting
        self.history[self.history.len() - 1]
    }

    /// Move to the successor state
    pub(crate) fn advance(&mut self) -> PipelineState {
        let from = self.current();
        match from.next() {
            Some(to) => {
                info!(from = %from, to = %to, "Pipeline state transition");
                self.history.push(to);
                to
            }
            None => from,
        }
    }

    pub(crate) fn into_history(self) -> Vec<PipelineState> {
        self.history
    }
}
