//! The engine facade.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quizroom_core::clock::Clock;
use quizroom_core::command::Command;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::{MessagingTransport, Prompt};
use quizroom_core::model::Participant;
use quizroom_core::repository::QuizRepository;
use quizroom_mechanics::{AnswerOutcome, MechanicContext, MechanicRegistry, RenderModel};
use quizroom_scenario::{LoadReport, ScenarioError, load_if_empty};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::command_handlers::{
    handle_advance, handle_record_answer, handle_register_participant,
};
use crate::application::display_hub::{DEFAULT_BUFFER, DisplayHub};
use crate::application::notifier::ParticipantNotifier;
use crate::application::query_handlers::{current_prompt, current_render_context};
use crate::application::state_machine::current;
use crate::domain::commands::{AdvanceEvent, RecordAnswer, RegisterParticipant, ResetEvent};
use crate::domain::events::DisplayEvent;
use crate::domain::transition::AdvanceOutcome;

/// Tunables of a `QuizEngine`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Scenario file loaded at startup and after a reset.
    pub scenario_path: PathBuf,
    /// Pause between two participant messages.
    pub send_delay: Duration,
    /// Per-connection display buffer.
    pub display_buffer: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scenario_path: PathBuf::from("scenario.yaml"),
            send_delay: Duration::from_millis(50),
            display_buffer: DEFAULT_BUFFER,
        }
    }
}

/// Orchestrates transitions, participant input and fan-out.
///
/// Transitions and resets are serialized by an advisory lock; participant
/// input is not, since each answer write is atomic on its own.
pub struct QuizEngine {
    repo: Arc<dyn QuizRepository>,
    clock: Arc<dyn Clock>,
    registry: Arc<MechanicRegistry>,
    display: DisplayHub,
    notifier: ParticipantNotifier,
    transition_lock: Mutex<()>,
    scenario_path: PathBuf,
}

impl std::fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizEngine")
            .field("registry", &self.registry)
            .field("display", &self.display)
            .field("scenario_path", &self.scenario_path)
            .finish_non_exhaustive()
    }
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        repo: Arc<dyn QuizRepository>,
        clock: Arc<dyn Clock>,
        registry: Arc<MechanicRegistry>,
        transport: Arc<dyn MessagingTransport>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repo,
            clock,
            registry,
            display: DisplayHub::new(settings.display_buffer),
            notifier: ParticipantNotifier::new(transport, settings.send_delay),
            transition_lock: Mutex::new(()),
            scenario_path: settings.scenario_path,
        }
    }

    fn ctx(&self) -> MechanicContext<'_> {
        MechanicContext::new(self.repo.as_ref(), self.clock.as_ref())
    }

    /// The display hub, for connection handlers to subscribe to.
    #[must_use]
    pub fn display(&self) -> &DisplayHub {
        &self.display
    }

    #[must_use]
    pub fn registry(&self) -> &MechanicRegistry {
        &self.registry
    }

    #[must_use]
    pub fn scenario_path(&self) -> &std::path::Path {
        &self.scenario_path
    }

    /// Loads the scenario unless the store already holds one.
    ///
    /// # Errors
    ///
    /// Returns any scenario read, parse or store error.
    pub async fn load_scenario(&self) -> Result<Option<LoadReport>, ScenarioError> {
        load_if_empty(
            self.repo.as_ref(),
            &self.registry,
            self.clock.as_ref(),
            &self.scenario_path,
        )
        .await
    }

    /// Moves the event one phase forward or back, then pushes the new state
    /// to displays and spawns participant notification.
    ///
    /// # Errors
    ///
    /// Returns any repository, registry or scoring error.
    pub async fn advance(&self, command: &AdvanceEvent) -> Result<AdvanceOutcome, DomainError> {
        let outcome = {
            let _guard = self.transition_lock.lock().await;
            handle_advance(command, &self.ctx(), &self.registry).await?
        };
        if let AdvanceOutcome::Moved { .. } = outcome {
            self.publish_state().await?;
            self.notify_participants().await?;
        }
        Ok(outcome)
    }

    /// Applies participant input to the current step and pushes progress to
    /// displays when counters changed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown participant, or any
    /// repository error.
    pub async fn record_answer(&self, command: &RecordAnswer) -> Result<AnswerOutcome, DomainError> {
        let outcome = handle_record_answer(command, &self.ctx(), &self.registry).await?;
        if let Some(progress) = &outcome.progress {
            self.display.broadcast(&DisplayEvent::Progress {
                progress: progress.clone(),
            });
        }
        Ok(outcome)
    }

    /// Registers or renames a participant, refreshes displays and returns
    /// the participant with its current prompts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for blank input, or any repository
    /// error.
    pub async fn register_participant(
        &self,
        command: &RegisterParticipant,
    ) -> Result<(Participant, Vec<Prompt>), DomainError> {
        let participant = handle_register_participant(command, &self.ctx()).await?;
        self.publish_state().await?;
        let prompts = self.current_prompt(&participant.id).await?;
        Ok((participant, prompts))
    }

    /// # Errors
    ///
    /// Returns any repository or registry error.
    pub async fn current_render_context(&self) -> Result<RenderModel, DomainError> {
        current_render_context(&self.ctx(), &self.registry).await
    }

    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown participant, or any
    /// repository or registry error.
    pub async fn current_prompt(&self, participant_id: &str) -> Result<Vec<Prompt>, DomainError> {
        current_prompt(&self.ctx(), &self.registry, participant_id).await
    }

    /// Wipes every record, reloads the scenario and tells displays to
    /// reload.
    ///
    /// # Errors
    ///
    /// Returns any store or scenario error.
    pub async fn reset(&self, command: &ResetEvent) -> Result<Option<LoadReport>, ScenarioError> {
        let report = {
            let _guard = self.transition_lock.lock().await;
            self.repo.reset().await?;
            self.load_scenario().await?
        };
        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            reloaded = report.is_some(),
            "Event reset"
        );
        self.display.broadcast(&DisplayEvent::Reload);
        Ok(report)
    }

    async fn publish_state(&self) -> Result<(), DomainError> {
        let render = self.current_render_context().await?;
        let delivered = self.display.broadcast(&DisplayEvent::state(render));
        debug!(delivered, "Display state published");
        Ok(())
    }

    async fn notify_participants(&self) -> Result<(), DomainError> {
        let Some((step, state)) = current(&self.ctx()).await? else {
            warn!("Transition left no current step, skipping notification");
            return Ok(());
        };
        let _task = self.notifier.spawn_broadcast(
            Arc::clone(&self.repo),
            Arc::clone(&self.clock),
            Arc::clone(&self.registry),
            step,
            state.phase,
        );
        Ok(())
    }
}
