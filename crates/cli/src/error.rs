use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Exit status: 2 for bad input, 3 for an expired session, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) | AppError::Engine(EngineError::Validation(_)) => 2,
            AppError::Engine(EngineError::AuthExpired) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_cause() {
        assert_eq!(AppError::Usage("no token".into()).exit_code(), 2);
        assert_eq!(
            AppError::from(EngineError::Validation("area".into())).exit_code(),
            2
        );
        assert_eq!(AppError::from(EngineError::AuthExpired).exit_code(), 3);
        assert_eq!(
            AppError::from(EngineError::Render("font".into())).exit_code(),
            1
        );
        assert_eq!(
            AppError::from(std::io::Error::other("disk full")).exit_code(),
            1
        );
    }
}
