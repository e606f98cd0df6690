//! Error taxonomy for the orchestration layer.
//!
//! Collaborator failures are typed per collaborator. `AppError` is what a
//! triggering operation reports; it is always converted to a [`Notice`] at the
//! boundary and never reaches the navigator or the session signal.

use crate::navigation::NavError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Network(String),
    #[error("auth request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected auth response: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("store request failed: {0}")]
    Network(String),
    #[error("store request failed ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("unexpected store response: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("location services are unavailable")]
    Unavailable,
    #[error("location read failed: {0}")]
    Read(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("sign-out failed: {0}")]
    Logout(#[source] AuthError),
    #[error("journal delete failed: {0}")]
    DeleteJournal(#[source] StoreError),
    #[error("profile load failed: {0}")]
    LoadProfile(#[source] StoreError),
    #[error("location save failed: {0}")]
    SaveLocation(#[source] StoreError),
    #[error("location permission denied")]
    PermissionDenied,
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Navigation(#[from] NavError),
}

/// User-visible message produced from an [`AppError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Logout(_) => Notice::new("Error", "Failed to logout. Please try again."),
            Self::DeleteJournal(_) => {
                Notice::new("Error", "Failed to delete journal. Please try again.")
            }
            Self::LoadProfile(_) => Notice::new("Error", "Failed to load your profile."),
            Self::SaveLocation(_) => {
                Notice::new("Error", "Failed to save your location. Please try again.")
            }
            Self::PermissionDenied => {
                Notice::new("Location", "You need to give location permission")
            }
            Self::Sensor(_) => Notice::new("Location", "Could not read your current location."),
            Self::NoSession => Notice::new("Error", "Please sign in again."),
            Self::Navigation(e) => Notice::new("Error", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages_match_client_copy() {
        let e = AppError::Logout(AuthError::Network("offline".to_string()));
        assert_eq!(e.notice().message, "Failed to logout. Please try again.");

        let e = AppError::DeleteJournal(StoreError::NotFound);
        assert_eq!(e.notice().message, "Failed to delete journal. Please try again.");

        assert_eq!(
            AppError::PermissionDenied.notice().message,
            "You need to give location permission"
        );
    }

    #[test]
    fn test_sensor_error_converts_into_app_error() {
        let e: AppError = SensorError::Unavailable.into();
        assert_eq!(e, AppError::Sensor(SensorError::Unavailable));
        assert_eq!(e.to_string(), "location services are unavailable");
    }
}
