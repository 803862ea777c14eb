use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Workflow errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Station errors
    #[error("Station is not running")]
    StationStopped,
}

pub type Result<T> = std::result::Result<T, Error>;
