//! Error types for toybox.
//!
//! Simulation code never fails; errors only come from the boundary
//! (control values coming out of the DOM, settings files, toy lookup).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToyError {
    #[error("unknown toy: {0}")]
    UnknownToy(String),

    #[error("toy '{toy}' has no control '{id}'")]
    UnknownControl { toy: &'static str, id: String },

    #[error("invalid value '{value}' for control '{id}'")]
    InvalidControlValue { id: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ToyError>;
