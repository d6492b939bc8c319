use core::result::Result as CoreResult;
use thiserror::Error;

pub type Result<T> = CoreResult<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bus transfer failed: {0:?}")]
    Transport(embedded_hal::i2c::ErrorKind),
    #[error("result block ended after {got} of {expected} bytes")]
    MalformedBlock { expected: usize, got: usize },
    #[error("gain or integration time code out of range")]
    InvalidConfig,
    #[error("sensor bring-up failed: {0}")]
    Initialization(#[source] Box<Error>),
}
