//! The pipeline itself: an ordered list of stage descriptors executed by a
//! single loop that stops and surfaces the stage's error on first failure.
//!
//! Strict total order (build -> stage -> launch); no retry, no parallelism,
//! no compensating transition back to an earlier state.

use crate::build;
use crate::error::Result;
use crate::launch;
use crate::runner::Runner;
use crate::stage;

/// Pipeline states. `Done` is reached only if all three stages complete;
/// `Failed` is terminal and carries the failing stage's error (as the
/// returned `RunError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Building,
    Staging,
    Launching,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Legal transitions: strictly forward through the stages, plus a jump
    /// to `Failed` from any active state.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (NotStarted, Building)
                | (Building, Staging)
                | (Staging, Launching)
                | (Launching, Done)
                | (NotStarted | Building | Staging | Launching, Failed)
        )
    }
}

/// Identifies a stage, for banners and failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageId {
    Build,
    Stage,
    Launch,
}

impl StageId {
    pub fn name(self) -> &'static str {
        match self {
            StageId::Build => "build",
            StageId::Stage => "stage",
            StageId::Launch => "launch",
        }
    }

    fn active_state(self) -> PipelineState {
        match self {
            StageId::Build => PipelineState::Building,
            StageId::Stage => PipelineState::Staging,
            StageId::Launch => PipelineState::Launching,
        }
    }
}

type StageFn = fn(&Runner) -> Result<()>;

/// The whole loop, in order. Each stage's command echoes and child output go
/// straight to the console; the descriptor only knows how to run the stage.
const STAGES: &[(StageId, StageFn)] = &[
    (StageId::Build, build::run),
    (StageId::Stage, stage::run),
    (StageId::Launch, launch::run),
];

pub struct Pipeline {
    state: PipelineState,
    runner: Runner,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::NotStarted,
            runner: Runner::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run all stages in order, stopping at the first failure.
    pub fn run(&mut self) -> Result<()> {
        self.run_stages(STAGES)
    }

    fn run_stages(&mut self, stages: &[(StageId, StageFn)]) -> Result<()> {
        for &(id, stage_fn) in stages {
            self.transition(id.active_state());
            if let Err(err) = stage_fn(&self.runner) {
                self.transition(PipelineState::Failed);
                eprintln!("pipeline failed in `{}` stage", id.name());
                return Err(err);
            }
        }
        self.transition(PipelineState::Done);
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
