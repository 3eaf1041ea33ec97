//! Route table errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Duplicate route path '{0}' at the same nesting level")]
    DuplicatePath(String),

    #[error("Duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },
}

pub type RouteResult<T> = Result<T, RouteError>;
