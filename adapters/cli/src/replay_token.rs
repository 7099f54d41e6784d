use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use uhi_greening_system_scenario::RecommendationRequest;

const TOKEN_DOMAIN: &str = "uhi";
const TOKEN_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded request payload.
const TOKEN_HEADER: &str = "uhi:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a recommendation request into a single-line replay token.
pub(crate) fn encode(request: &RecommendationRequest) -> serde_json::Result<String> {
    let json = serde_json::to_vec(request)?;
    Ok(format!("{TOKEN_HEADER}:{}", STANDARD_NO_PAD.encode(json)))
}

/// Decodes a recommendation request from a replay token.
pub(crate) fn decode(value: &str) -> Result<RecommendationRequest, ReplayTokenError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReplayTokenError::EmptyToken);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts
        .next()
        .filter(|domain| !domain.is_empty())
        .ok_or(ReplayTokenError::MissingPrefix)?;
    let version = parts.next().ok_or(ReplayTokenError::MissingVersion)?;
    let payload = parts.next().ok_or(ReplayTokenError::MissingPayload)?;

    if domain != TOKEN_DOMAIN {
        return Err(ReplayTokenError::InvalidPrefix(domain.to_owned()));
    }
    if version != TOKEN_VERSION {
        return Err(ReplayTokenError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(ReplayTokenError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(ReplayTokenError::InvalidPayload)
}

/// Errors that can occur while decoding replay tokens.
#[derive(Debug)]
pub(crate) enum ReplayTokenError {
    /// The provided string was empty or contained only whitespace.
    EmptyToken,
    /// The prefix segment was missing from the token.
    MissingPrefix,
    /// The token did not contain a version segment.
    MissingVersion,
    /// The token did not include the payload segment.
    MissingPayload,
    /// The token used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The token used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload was not a valid recommendation request.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ReplayTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "replay token was empty"),
            Self::MissingPrefix => write!(f, "replay token is missing the prefix"),
            Self::MissingVersion => write!(f, "replay token is missing the version"),
            Self::MissingPayload => write!(f, "replay token is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "replay token prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "replay token version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode replay token payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse replay token payload: {error}")
            }
        }
    }
}

impl Error for ReplayTokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
