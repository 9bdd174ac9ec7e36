//! View error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Invalid load state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Navigation error: {0}")]
    Navigation(#[from] wren_navigation::NavigationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
