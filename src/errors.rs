use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inconsistent vertex table: {0}")]
    InconsistentTable(String),
    #[error("load error: {0}")]
    Load(String),
    #[error("pairing error: {0}")]
    Pairing(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PairingError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        PairingError::InvalidInput(msg.into())
    }

    pub fn inconsistent<T: Into<String>>(msg: T) -> Self {
        PairingError::InconsistentTable(msg.into())
    }

    pub fn load<T: Into<String>>(msg: T) -> Self {
        PairingError::Load(msg.into())
    }

    pub fn pairing<T: Into<String>>(msg: T) -> Self {
        PairingError::Pairing(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PairingError::Serialization(msg.into())
    }
}
