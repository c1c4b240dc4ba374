//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
///
/// Moderator controls and participant inputs are both modelled as commands so
/// that every state change can be traced by its correlation ID.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}
