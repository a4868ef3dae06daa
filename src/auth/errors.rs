use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::auth::repo::StoreError;

/// Terminal outcome of a form submission, rendered as a small HTML fragment.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("A user with this email already exists.")]
    EmailTaken,
    #[error("User not found.")]
    UnknownEmail,
    #[error("Wrong password.")]
    WrongPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::PasswordMismatch | PageError::EmailTaken => StatusCode::BAD_REQUEST,
            PageError::UnknownEmail | PageError::WrongPassword => StatusCode::UNAUTHORIZED,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn back_link(&self) -> &'static str {
        match self {
            PageError::PasswordMismatch | PageError::EmailTaken => "/register",
            PageError::UnknownEmail | PageError::WrongPassword => "/login",
            PageError::Internal(_) => "/",
        }
    }
}

impl From<StoreError> for PageError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => PageError::EmailTaken,
            StoreError::Database(e) => PageError::Internal(e.into()),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let message = match &self {
            PageError::Internal(e) => {
                error!(error = %e, "request failed");
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        };
        let body = format!(
            "<h3>{message}</h3><p><a href='{}'>Back</a></p>",
            self.back_link()
        );
        (self.status(), Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(PageError::PasswordMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(PageError::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(PageError::UnknownEmail.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(PageError::WrongPassword.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PageError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflict_maps_to_email_taken() {
        assert!(matches!(
            PageError::from(StoreError::Conflict),
            PageError::EmailTaken
        ));
    }
}
