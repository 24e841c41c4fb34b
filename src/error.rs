//! Engine error kinds
//!
//! All four kinds are recoverable: operations report them to the caller and
//! leave session state untouched. None is fatal to the process.

use thiserror::Error;

/// Errors surfaced by the rules engine and its persistence edge
#[derive(Debug, Error)]
pub enum EngineError {
    /// A spendable pool (rage charges, hit dice) has nothing left
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Action invoked outside its valid state
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A static data lookup failed (unknown skill, attack, damage type, ...)
    #[error("missing rule data: {0}")]
    MissingRuleData(String),

    /// The save/load collaborator is unreachable; in-memory state stands
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}
