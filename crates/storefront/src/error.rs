//! Errors surfaced to synchronizer callers, plus Sentry breadcrumb helpers.
//!
//! [`SyncError`] is the whole taxonomy a UI has to handle. Its `Display`
//! output is the toast text, so callers can show it directly.

use thiserror::Error;

use crate::api::RemoteError;

/// Errors returned by cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The remote operation requires a logged-in session.
    #[error("Please login first")]
    Unauthenticated,

    /// Network or server error. Retryable by user action, never automatically.
    #[error("{0}")]
    RequestFailed(String),

    /// The caller asked for a quantity below one.
    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthenticated => Self::Unauthenticated,
            RemoteError::Rejected(message) | RemoteError::Status { message, .. }
                if !message.trim().is_empty() =>
            {
                Self::RequestFailed(message)
            }
            RemoteError::Rejected(_) => Self::RequestFailed("Error".to_string()),
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

/// Result type alias for `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error. Without an initialized Sentry client this
/// does nothing.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_is_distinct() {
        let err = SyncError::from(RemoteError::Unauthenticated);
        assert_eq!(err, SyncError::Unauthenticated);
        assert_eq!(err.to_string(), "Please login first");
    }

    #[test]
    fn test_rejection_keeps_server_message() {
        let err = SyncError::from(RemoteError::Rejected("Out of stock".to_string()));
        assert_eq!(err, SyncError::RequestFailed("Out of stock".to_string()));
    }

    #[test]
    fn test_empty_rejection_falls_back_to_generic_message() {
        let err = SyncError::from(RemoteError::Rejected(String::new()));
        assert_eq!(err.to_string(), "Error");
    }

    #[test]
    fn test_timeout_is_request_failed() {
        let err = SyncError::from(RemoteError::Timeout);
        assert!(matches!(err, SyncError::RequestFailed(_)));
    }

    #[test]
    fn test_status_without_message_describes_status() {
        let err = SyncError::from(RemoteError::Status {
            status: 503,
            message: String::new(),
        });
        assert_eq!(err.to_string(), "Server returned HTTP 503");
    }
}
