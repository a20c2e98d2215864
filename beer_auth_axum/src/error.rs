use beer_auth::CoordinationError;
use http::StatusCode;

/// Converts flow errors into an opaque HTTP status.
///
/// The specific kind was already logged by [`CoordinationError::log`]; callers only
/// ever see a 500 with an empty body.
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, StatusCode>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, StatusCode> {
        self.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beer_auth::{OAuth2Error, UserError};

    #[test]
    fn test_every_error_is_internal_server_error() {
        let errors = vec![
            CoordinationError::OAuth2(OAuth2Error::MissingIdToken),
            CoordinationError::Persistence(UserError::Storage("down".to_string())),
            CoordinationError::DecodeRequest("bad json".to_string()),
            CoordinationError::InvalidState("mismatch".to_string()),
            CoordinationError::MissingBearer,
        ];

        for err in errors {
            let result: Result<(), CoordinationError> = Err(err);
            assert_eq!(
                result.into_response_error(),
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            );
        }
    }

    #[test]
    fn test_success_passes_through() {
        let result: Result<&str, CoordinationError> = Ok("ok");
        assert_eq!(result.into_response_error(), Ok("ok"));
    }
}
