//! Station directory error types.

use crate::gtfs::StoreError;

/// Errors returned by [`StationDirectory`](super::StationDirectory) queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No GTFS station sits at the station's coordinates
    #[error("station details not found for {name}")]
    NotFound { name: String },

    /// A later nearby request replaced this one before the index loaded
    #[error("nearby request superseded by a later request")]
    Superseded,

    /// The reference data needed for station details will never load
    #[error(transparent)]
    Unavailable(#[from] StoreError),

    /// The directory was shut down before answering
    #[error("station directory closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DirectoryError::NotFound {
            name: "Kings Hwy".into(),
        };
        assert_eq!(err.to_string(), "station details not found for Kings Hwy");
        assert_eq!(DirectoryError::Closed.to_string(), "station directory closed");

        let err = DirectoryError::from(StoreError::Unavailable {
            reason: "cancelled".into(),
        });
        assert_eq!(err.to_string(), "reference data unavailable: cancelled");
    }
}
