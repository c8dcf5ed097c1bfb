use crate::quantity::power::Megawatts;

/// Reasons a production plan could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The request is malformed or out of domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No allocation meets the load within the tolerance while respecting every envelope.
    #[error("cannot meet the load of {load}: {reason}")]
    Infeasible { load: Megawatts, reason: String },

    /// Arithmetic edge case which validation should have ruled out.
    #[error("computation error: {0}")]
    Computation(String),
}

impl PlanError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn infeasible(load: Megawatts, reason: impl Into<String>) -> Self {
        Self::Infeasible { load, reason: reason.into() }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }
}
