use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static AUTH_CONFIG: OnceLock<AuthConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        Ok(Self { secret })
    }
}

/// Initialize auth config from environment. Must be called once at startup.
pub fn init_auth_config(config: AuthConfig) -> Result<()> {
    AUTH_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Auth config already initialized"))?;
    Ok(())
}

fn get_config() -> &'static AuthConfig {
    AUTH_CONFIG
        .get()
        .expect("Auth config not initialized — call init_auth_config() at startup")
}

/// Claims minted by the identity provider. This service never issues
/// sessions of its own; it verifies the signature and trusts the actor
/// fields carried in the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String, // actor id
    pub name: String, // display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: String,
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
}

pub fn decode_identity_token(token: &str) -> Result<IdentityClaims> {
    let config = get_config();

    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow::anyhow!("Failed to decode identity token: {}", e))
}

/// Mint an identity token with the shared secret. Used by tests and local
/// tooling standing in for the identity provider.
pub fn encode_identity_token(
    user_id: i32,
    name: &str,
    avatar: Option<&str>,
    role: &str,
) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = IdentityClaims {
        sub: user_id.to_string(),
        name: name.to_owned(),
        avatar: avatar.map(|a| a.to_owned()),
        role: role.to_owned(),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode identity token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn ensure_config() {
        INIT.call_once(|| {
            std::env::set_var("JWT_SECRET", "a_very_long_secret_key_that_is_at_least_32_chars");
            let config = AuthConfig::from_env().unwrap();
            let _ = init_auth_config(config);
        });
    }

    #[test]
    fn encode_decode_round_trip() {
        ensure_config();
        let token = encode_identity_token(42, "alice", Some("https://cdn/a.png"), "user").unwrap();
        let claims = decode_identity_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.avatar.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_fails() {
        ensure_config();
        let token = encode_identity_token(42, "alice", None, "user").unwrap();
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(decode_identity_token(&tampered).is_err());
    }

    #[test]
    fn expired_token_fails() {
        ensure_config();
        let config = get_config();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = IdentityClaims {
            sub: "42".to_string(),
            name: "alice".to_string(),
            avatar: None,
            role: "user".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(decode_identity_token(&token).is_err());
    }

    #[test]
    fn empty_token_fails() {
        ensure_config();
        assert!(decode_identity_token("").is_err());
    }
}
