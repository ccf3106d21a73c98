use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const KIND_ACCESS: &str = "access";
const KIND_REFRESH: &str = "refresh";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub signing_key: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub key_prefix: KeyPrefix,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    #[serde(rename = "userID")]
    user_id: i64,
    role: String,
    exp: i64,
    iat: i64,
    typ: String,
    jti: String, // keeps pairs issued within one second distinct
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    #[serde(rename = "userID")]
    user_id: i64,
    exp: i64,
    iat: i64,
    typ: String,
    jti: String,
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> i64 {
    now.timestamp()
        .saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

fn validation() -> Validation {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.leeway = 0;
    v.set_required_spec_claims(&["exp"]);
    v
}

/// HS256 token authority over a shared secret.
pub struct JwtTokenAuthority {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenAuthority {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key);
        JwtTokenAuthority {
            cfg,
            encoding_key,
            decoding_key,
        }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, TokenError> {
        let data = decode::<T>(token, &self.decoding_key, &validation())
            .map_err(|_| TokenError::Invalid)?;
        Ok(data.claims)
    }
}

impl TokenAuthority for JwtTokenAuthority {
    fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let access_exp = expiry(now, self.cfg.access_ttl);
        let refresh_exp = expiry(now, self.cfg.refresh_ttl);

        let access_token = self.sign(&AccessClaims {
            user_id: user.id.0,
            role: user.role.clone(),
            exp: access_exp,
            iat: now.timestamp(),
            typ: KIND_ACCESS.to_string(),
            jti: Self::gen_jti(),
        })?;
        let refresh_token = self.sign(&RefreshClaims {
            user_id: user.id.0,
            exp: refresh_exp,
            iat: now.timestamp(),
            typ: KIND_REFRESH.to_string(),
            jti: Self::gen_jti(),
        })?;

        Ok(TokenPair {
            access_token,
            expires_at: access_exp,
            refresh_token,
        })
    }

    fn parse_access(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let claims: AccessClaims = self.verify(token)?;
        if claims.typ != KIND_ACCESS {
            return Err(TokenError::Invalid);
        }
        Ok(AccessTokenClaims {
            user_id: UserId(claims.user_id),
            role: claims.role,
            expires_at: claims.exp,
        })
    }

    fn parse_refresh(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        let claims: RefreshClaims = self.verify(token)?;
        if claims.typ != KIND_REFRESH {
            return Err(TokenError::Invalid);
        }
        Ok(RefreshTokenClaims {
            user_id: UserId(claims.user_id),
            expires_at: claims.exp,
        })
    }

    fn key_for(&self, user_id: UserId) -> String {
        self.cfg.key_prefix.key_for(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            signing_key: secret.as_bytes().to_vec(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            key_prefix: KeyPrefix::new("auth:"),
        }
    }

    fn alice() -> User {
        User {
            id: UserId(42),
            username: "alice".to_string(),
            role: "client".to_string(),
        }
    }

    #[test]
    fn issued_pair_parses_back() {
        let authority = JwtTokenAuthority::new(config("secret"));
        let now = Utc::now();
        let pair = authority.issue(&alice(), now).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(pair.expires_at, now.timestamp() + 15 * 60);

        let access = authority.parse_access(&pair.access_token).unwrap();
        assert_eq!(access.user_id, UserId(42));
        assert_eq!(access.role, "client");
        assert_eq!(access.expires_at, pair.expires_at);

        let refresh = authority.parse_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.user_id, UserId(42));
        assert_eq!(refresh.expires_at, now.timestamp() + 7 * 24 * 60 * 60);
    }

    #[test]
    fn pairs_issued_in_the_same_second_differ() {
        let authority = JwtTokenAuthority::new(config("secret"));
        let now = Utc::now();
        let first = authority.issue(&alice(), now).unwrap();
        let second = authority.issue(&alice(), now).unwrap();
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = JwtTokenAuthority::new(config("secret"));
        let theirs = JwtTokenAuthority::new(config("another-secret"));
        let pair = theirs.issue(&alice(), Utc::now()).unwrap();

        assert!(matches!(
            ours.parse_access(&pair.access_token),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            ours.parse_refresh(&pair.refresh_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let authority = JwtTokenAuthority::new(config("secret"));
        assert!(matches!(authority.parse_access(""), Err(TokenError::Invalid)));
        assert!(matches!(
            authority.parse_refresh("not.a.jwt"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let authority = JwtTokenAuthority::new(config("secret"));
        let pair = authority.issue(&alice(), Utc::now()).unwrap();
        assert!(authority.parse_access(&pair.refresh_token).is_err());
        assert!(authority.parse_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let authority = JwtTokenAuthority::new(config("secret"));
        let long_ago = Utc::now() - chrono::Duration::days(30);
        let pair = authority.issue(&alice(), long_ago).unwrap();

        assert!(matches!(
            authority.parse_access(&pair.access_token),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            authority.parse_refresh(&pair.refresh_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn key_uses_configured_prefix() {
        let authority = JwtTokenAuthority::new(config("secret"));
        assert_eq!(authority.key_for(UserId(42)), "auth:42");
    }
}
