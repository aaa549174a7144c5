use secrecy::SecretString;

use crate::error::{Result, TranscriptionError};

/// Resolve the caller's AssemblyAI key from an `Authorization` header value
///
/// Accepts `Bearer <key>` or the bare key.
pub fn api_key(authorization: Option<&str>) -> Result<SecretString> {
    let header = authorization.ok_or(TranscriptionError::MissingAuthorization)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        return Err(TranscriptionError::InvalidAuthorization);
    }

    Ok(SecretString::from(token.to_string()))
}
