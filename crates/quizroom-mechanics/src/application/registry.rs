//! The step-type registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quizroom_core::error::DomainError;
use quizroom_core::model::{GlobalState, Mechanic, Step};

use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::leaderboard::LeaderboardHandler;
use crate::application::multi_choice::MultiChoiceHandler;
use crate::application::open_answer::OpenAnswerHandler;
use crate::application::ordering::OrderingHandler;
use crate::application::registration::RegistrationHandler;
use crate::application::single_choice::SingleChoiceHandler;
use crate::domain::render::RenderModel;

/// Table of mechanic handlers keyed by mechanic, with a secondary index by
/// selection routing key.
#[derive(Clone, Default)]
pub struct MechanicRegistry {
    handlers: HashMap<Mechanic, Arc<dyn MechanicHandler>>,
    routes: HashMap<&'static str, Mechanic>,
}

impl MechanicRegistry {
    /// A registry with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry with every built-in mechanic.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(RegistrationHandler));
        registry.register(Arc::new(OpenAnswerHandler));
        registry.register(Arc::new(SingleChoiceHandler));
        registry.register(Arc::new(MultiChoiceHandler));
        registry.register(Arc::new(OrderingHandler));
        registry.register(Arc::new(LeaderboardHandler));
        registry
    }

    /// Adds or replaces the handler for its mechanic.
    pub fn register(&mut self, handler: Arc<dyn MechanicHandler>) {
        let mechanic = handler.mechanic();
        self.routes.retain(|_, m| *m != mechanic);
        if let Some(key) = handler.routing_key() {
            self.routes.insert(key, mechanic);
        }
        self.handlers.insert(mechanic, handler);
    }

    /// Looks up the handler of a mechanic.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no handler is registered.
    pub fn handler(&self, mechanic: Mechanic) -> Result<&dyn MechanicHandler, DomainError> {
        self.handlers
            .get(&mechanic)
            .map(Arc::as_ref)
            .ok_or_else(|| DomainError::NotFound(format!("no handler for mechanic {mechanic}")))
    }

    /// The mechanic that owns a selection routing key.
    #[must_use]
    pub fn by_routing_key(&self, key: &str) -> Option<Mechanic> {
        self.routes.get(key).copied()
    }

    /// Splits an inbound selection payload into routing key and value.
    #[must_use]
    pub fn split_selection(payload: &str) -> Option<(&str, &str)> {
        payload.split_once(':')
    }

    /// Live phase count of `step`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unregistered mechanic, or any
    /// repository error.
    pub async fn phase_count(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
    ) -> Result<u32, DomainError> {
        self.handler(step.mechanic)?.phase_count(ctx, step).await
    }

    /// Display context of `step` with its live phase count filled in.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unregistered mechanic, or any
    /// repository error.
    pub async fn render(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let handler = self.handler(step.mechanic)?;
        let mut model = handler.display_context(ctx, step, state).await?;
        model.phase_count = handler.phase_count(ctx, step).await?;
        Ok(model)
    }
}

impl fmt::Debug for MechanicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mechanics: Vec<Mechanic> = self.handlers.keys().copied().collect();
        mechanics.sort();
        f.debug_struct("MechanicRegistry")
            .field("mechanics", &mechanics)
            .field("routes", &self.routes)
            .finish()
    }
}
