use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("Step {0} ended with errors")]
    Step(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid code: {0}")]
    InvalidCode(String),

    #[error("Configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
