use genres_types::claim::TimeLimited;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// Issues and validates HS256 signed API tokens
pub struct TokenManager {
    keys: Keys,
    default_validity: std::time::Duration,
    header: Header,
    validation: Validation,
}

impl TokenManager {
    pub fn new(secret: impl AsRef<[u8]>, default_validity: std::time::Duration) -> Self {
        let mut validation = Validation::default();
        // exp is checked strictly against current time
        validation.leeway = 0;
        let header = Header::default();
        Self {
            keys: Keys::new(secret),
            default_validity,
            header,
            validation,
        }
    }

    pub fn issue(&self, mut claims: impl serde::Serialize + TimeLimited) -> Result<String> {
        let now = std::time::SystemTime::now();
        let validity = now + self.default_validity;
        claims.set_validity(validity);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    #[cfg(test)]
    pub fn issue_expired(&self, mut claims: impl serde::Serialize + TimeLimited) -> Result<String> {
        let now = std::time::SystemTime::now();
        let validity = now - self.default_validity;
        claims.set_validity(validity);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    pub fn validate<T>(&self, token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let data = decode::<T>(token, &self.keys.decoding, &self.validation).inspect_err(|e| {
            debug!("Token validation failed: {e}");
        })?;
        Ok(data.claims)
    }

    pub fn default_validity(&self) -> std::time::Duration {
        self.default_validity
    }
}

#[cfg(test)]
mod tests {
    use genres_types::claim::ApiClaim;
    use tracing_test::traced_test;

    use super::*;

    fn claim() -> ApiClaim {
        ApiClaim::new_expired("sherlock", ["user".parse::<genres_types::claim::Role>().unwrap()])
    }

    #[test]
    fn test_token() {
        let manager = TokenManager::new("secret", std::time::Duration::from_secs(3600));
        let token = manager.issue(claim()).unwrap();
        let res = manager.validate::<ApiClaim>(&token);
        assert!(res.is_ok());
        let claim = res.unwrap();
        assert_eq!(claim.sub, "sherlock");
        assert!(claim.roles.contains("user"));
        assert!(claim.check_validity());
    }

    #[test]
    fn test_token_expiration() {
        let manager = TokenManager::new("secret", std::time::Duration::from_secs(3600));
        let token = manager.issue_expired(claim()).unwrap();
        let res = manager.validate::<ApiClaim>(&token);
        let err = res.unwrap_err();
        assert!(err.is_expired(), "Unexpected error: {}", err);
    }

    #[test]
    #[traced_test]
    fn test_token_wrong_secret() {
        let manager = TokenManager::new("secret", std::time::Duration::from_secs(3600));
        let other = TokenManager::new("other secret", std::time::Duration::from_secs(3600));
        let token = other.issue(claim()).unwrap();
        let err = manager.validate::<ApiClaim>(&token).unwrap_err();
        assert!(!err.is_expired());
        assert!(logs_contain("Token validation failed"));
    }

    #[test]
    fn test_garbage_token() {
        let manager = TokenManager::new("secret", std::time::Duration::from_secs(3600));
        assert!(manager.validate::<ApiClaim>("not.a.token").is_err());
    }
}
