//! Canonical error classification for Docker Engine/Swarm operations

use std::time::Duration;

/// Errors the adapter can return. Every variant is already classified into
/// one of the canonical kinds a caller needs to act on; raw `bollard`
/// transport errors never escape this boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("daemon returned an error: {0}")]
    UpstreamFailure(String),

    #[error("could not reach the Docker daemon: {0}")]
    Unavailable(String),

    #[error("capability not supported by this daemon: {0}")]
    UnsupportedCapability(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal adapter error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify a raw bollard error into one of the canonical kinds.
    pub fn from_bollard(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as BErr;

        match err {
            BErr::DockerResponseServerError {
                status_code,
                message,
            } => match status_code {
                404 => Error::NotFound(message),
                409 => Error::Conflict(message),
                403 | 401 => Error::Forbidden(message),
                500..=599 => Error::UpstreamFailure(message),
                _ => Error::UpstreamFailure(message),
            },
            BErr::HyperResponseError(e) => Error::Unavailable(e.to_string()),
            BErr::IOError { err } => Error::Unavailable(err.to_string()),
            other => Error::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::errors::Error as BErr;

    #[test]
    fn test_404_maps_to_not_found() {
        let err = Error::from_bollard(BErr::DockerResponseServerError {
            status_code: 404,
            message: "no such container".to_string(),
        });
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_409_maps_to_conflict() {
        let err = Error::from_bollard(BErr::DockerResponseServerError {
            status_code: 409,
            message: "container already running".to_string(),
        });
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_401_and_403_map_to_forbidden() {
        for code in [401, 403] {
            let err = Error::from_bollard(BErr::DockerResponseServerError {
                status_code: code,
                message: "unauthorized".to_string(),
            });
            assert!(matches!(err, Error::Forbidden(_)));
        }
    }

    #[test]
    fn test_5xx_maps_to_upstream_failure() {
        let err = Error::from_bollard(BErr::DockerResponseServerError {
            status_code: 503,
            message: "daemon overloaded".to_string(),
        });
        assert!(matches!(err, Error::UpstreamFailure(_)));
    }

    #[test]
    fn test_unrecognized_status_falls_back_to_upstream_failure() {
        let err = Error::from_bollard(BErr::DockerResponseServerError {
            status_code: 418,
            message: "teapot".to_string(),
        });
        assert!(matches!(err, Error::UpstreamFailure(_)));
    }
}
