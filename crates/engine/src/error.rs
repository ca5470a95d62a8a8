use crate::host::HostError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine task is no longer running")]
    EngineStopped,

    #[error(transparent)]
    Host(#[from] HostError),
}
