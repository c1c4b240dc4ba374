//! Background participant notification.

use std::sync::Arc;
use std::time::Duration;

use quizroom_core::clock::Clock;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::MessagingTransport;
use quizroom_core::model::Step;
use quizroom_core::repository::QuizRepository;
use quizroom_mechanics::{MechanicContext, MechanicRegistry};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Pushes the current prompts to every registered participant from a
/// spawned task, pausing between sends.
#[derive(Clone)]
pub struct ParticipantNotifier {
    transport: Arc<dyn MessagingTransport>,
    send_delay: Duration,
}

impl std::fmt::Debug for ParticipantNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantNotifier")
            .field("send_delay", &self.send_delay)
            .finish_non_exhaustive()
    }
}

impl ParticipantNotifier {
    #[must_use]
    pub fn new(transport: Arc<dyn MessagingTransport>, send_delay: Duration) -> Self {
        Self {
            transport,
            send_delay,
        }
    }

    /// Spawns delivery of `step` at `phase` to everyone. The handle resolves
    /// to the number of prompts delivered.
    pub fn spawn_broadcast(
        &self,
        repo: Arc<dyn QuizRepository>,
        clock: Arc<dyn Clock>,
        registry: Arc<MechanicRegistry>,
        step: Step,
        phase: u32,
    ) -> JoinHandle<usize> {
        let notifier = self.clone();
        tokio::spawn(async move {
            let ctx = MechanicContext::new(repo.as_ref(), clock.as_ref());
            match notifier.deliver(&ctx, &registry, &step, phase).await {
                Ok(sent) => sent,
                Err(e) => {
                    warn!(step_id = step.id, phase, error = %e, "Participant notification aborted");
                    0
                }
            }
        })
    }

    async fn deliver(
        &self,
        ctx: &MechanicContext<'_>,
        registry: &MechanicRegistry,
        step: &Step,
        phase: u32,
    ) -> Result<usize, DomainError> {
        let handler = registry.handler(step.mechanic)?;
        let participants = ctx.repo.participants().await?;
        let mut sent = 0;
        for participant in &participants {
            let prompts = match handler.participant_prompt(ctx, participant, step, phase).await {
                Ok(prompts) => prompts,
                Err(e) => {
                    warn!(participant_id = %participant.id, error = %e, "Cannot build prompt, skipping");
                    continue;
                }
            };
            for prompt in &prompts {
                match self.transport.send(&participant.id, prompt).await {
                    Ok(()) => {
                        sent += 1;
                        debug!(participant_id = %participant.id, "Prompt delivered");
                    }
                    Err(e) => {
                        warn!(participant_id = %participant.id, error = %e, "Prompt delivery failed, skipping");
                    }
                }
                if !self.send_delay.is_zero() {
                    tokio::time::sleep(self.send_delay).await;
                }
            }
        }
        info!(step_id = step.id, phase, participants = participants.len(), sent, "Participants notified");
        Ok(sent)
    }
}
