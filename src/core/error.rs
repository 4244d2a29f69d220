//! Engine error taxonomy.
//!
//! Everything except [`EngineError::EmptyQueue`] is recoverable: the input is
//! rejected, the state is left untouched and the pending decision stays
//! pending. An empty queue means some option forgot to enqueue a successor.

use thiserror::Error;

use super::PlayerId;
use crate::decision::DecisionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("decision {decision} has already been resolved")]
    InvalidDecisionState { decision: DecisionId },

    #[error("decision {decision} is not the decision currently presented")]
    UnknownDecision { decision: DecisionId },

    #[error("no decision is pending; the turn flow lost its successor")]
    EmptyQueue,

    #[error("option `{option}` is not offered by decision {decision}")]
    IllegalOption { decision: DecisionId, option: String },

    #[error("argument {argument} is outside {min}..={max} for decision {decision}")]
    ArgumentOutOfRange {
        decision: DecisionId,
        argument: i32,
        min: i32,
        max: i32,
    },

    #[error("{player} needs {needed} currency but has {available}")]
    InsufficientResource {
        player: PlayerId,
        needed: i32,
        available: i32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
