use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::auth::entities::{IssuedToken, TokenClaims};
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::TokenIssuer;
use crate::domain::auth::value_objects::Email;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: Uuid,
  email: String,
  iat: i64,
  exp: i64,
}

/// HS256 JWT issuer
///
/// Tokens carry the company id as `sub` plus its email, and expire after the
/// configured TTL.
pub struct JwtTokenIssuer {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl JwtTokenIssuer {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }
}

impl TokenIssuer for JwtTokenIssuer {
  fn issue(&self, company_id: Uuid, email: &Email) -> Result<IssuedToken, AuthError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + self.ttl;
    let claims = Claims {
      sub: company_id,
      email: email.as_str().to_string(),
      iat: issued_at.timestamp(),
      exp: expires_at.timestamp(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AuthError::Token(format!("Failed to sign token: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
  }

  fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
    let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
      tracing::debug!("Rejected access token: {}", e);
      AuthError::InvalidToken
    })?;

    let expires_at =
      DateTime::<Utc>::from_timestamp(data.claims.exp, 0).ok_or(AuthError::InvalidToken)?;

    Ok(TokenClaims {
      company_id: data.claims.sub,
      email: data.claims.email,
      expires_at,
    })
  }
}
