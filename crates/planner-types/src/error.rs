//! Error taxonomy shared across the planner.

use thiserror::Error;

/// Result type for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// The five error kinds a fuel-route plan can fail with.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// An address could not be resolved, or resolved outside the USA.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// The routing engine returned no usable route.
    #[error("no route found: {0}")]
    NoRouteFound(String),

    /// No purchase sequence can complete the route without running out of fuel.
    #[error("no feasible fuel plan: {0}")]
    NoFeasibleFuelPlan(String),

    /// A transient failure talking to an upstream HTTP service, retries exhausted.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// A malformed or out-of-range request.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl PlannerError {
    /// The wire error code used in the HTTP error body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLocation(_) => "invalid_location",
            Self::NoRouteFound(_) => "no_route",
            Self::NoFeasibleFuelPlan(_) => "no_feasible_plan",
            Self::ExternalService(_) => "upstream_error",
            Self::Validation(_) => "validation_error",
        }
    }

    /// The HTTP status code the boundary layer maps this error to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidLocation(_) | Self::Validation(_) => 400,
            Self::NoFeasibleFuelPlan(_) => 422,
            Self::NoRouteFound(_) | Self::ExternalService(_) => 502,
        }
    }
}
