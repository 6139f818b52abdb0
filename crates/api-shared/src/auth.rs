//! Bearer token extraction.
//!
//! Token *resolution* (which user a token belongs to) lives in `cardio-core`; this module only
//! deals with the shape of the `Authorization` header.

/// Errors raised while reading an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use the Bearer scheme")]
    MalformedHeader,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is ignored.
///
/// # Errors
/// Returns `AuthError::MissingHeader` when no header was supplied and
/// `AuthError::MalformedHeader` when the scheme is wrong or the token is empty.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?.trim();

    let (scheme, token) = header
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_bearer_header() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Ok("abc123"));
        assert_eq!(bearer_token(Some("bearer   abc123 ")), Ok("abc123"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("Bearer    ")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("")), Err(AuthError::MalformedHeader));
    }
}
