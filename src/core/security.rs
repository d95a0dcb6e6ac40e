use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("jwt encoding failed")]
    JwtEncoding,
    #[error("jwt decoding failed")]
    JwtDecoding,
    #[error("unsupported jwt algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Claims carried by bearer tokens issued by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

/// Tokens are normally minted by the identity service; this exists so the
/// local tooling and the test suite can produce compatible ones.
#[cfg_attr(not(test), allow(dead_code))]
pub(crate) fn create_access_token(
    subject: &str,
    settings: &Settings,
    expires_in: Option<Duration>,
) -> Result<String, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let lifetime = expires_in.unwrap_or_else(|| {
        Duration::minutes(settings.security().access_token_expire_minutes as i64)
    });
    let claims = Claims {
        sub: subject.to_string(),
        exp: (OffsetDateTime::now_utc() + lifetime).unix_timestamp(),
    };

    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(settings.security().secret_key.as_bytes()),
    )
    .map_err(|_| SecurityError::JwtEncoding)
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.security().secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| SecurityError::JwtDecoding)
}

fn algorithm_from_settings(settings: &Settings) -> Result<Algorithm, SecurityError> {
    match settings.security().algorithm.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(SecurityError::UnsupportedAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn token_roundtrip_keeps_subject() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let token =
            create_access_token("student-7", &settings, Some(Duration::minutes(1))).expect("token");
        let claims = verify_token(&token, &settings).expect("claims");

        assert_eq!(claims.sub, "student-7");
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let token = create_access_token("student-7", &settings, Some(Duration::minutes(-5)))
            .expect("token");

        assert!(matches!(verify_token(&token, &settings), Err(SecurityError::JwtDecoding)));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");
        let token = create_access_token("student-7", &settings, None).expect("token");

        std::env::set_var("SECRET_KEY", "another-secret");
        let other = Settings::load().expect("settings");
        test_support::set_test_env();

        assert!(verify_token(&token, &other).is_err());
    }
}
