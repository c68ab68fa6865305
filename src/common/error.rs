use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Position sensor unavailable: {reason}")]
    SensorUnavailable { reason: String },

    #[error("Route unavailable: {reason}")]
    RouteUnavailable { reason: String },

    #[error("Invalid coordinate: {reason}")]
    InvalidCoordinate { reason: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Position stream closed before arrival")]
    SensorStreamClosed,

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
