use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: need at least {required} candles, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Market data feed error: {0}")]
    Feed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fails with `InsufficientData` when `candles` holds fewer than `required` entries.
pub fn ensure_len<T>(candles: &[T], required: usize) -> Result<()> {
    if candles.len() < required {
        return Err(Error::InsufficientData {
            required,
            actual: candles.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_len_reports_shortfall() {
        let data = vec![0u8; 7];
        match ensure_len(&data, 10) {
            Err(Error::InsufficientData { required, actual }) => {
                assert_eq!(required, 10);
                assert_eq!(actual, 7);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
        assert!(ensure_len(&data, 7).is_ok());
    }
}
