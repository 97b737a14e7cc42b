//! Password Service
//!
//! Argon2id hashing with a minimum-length policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{PlatformError, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        // OWASP minimum for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Config {
    /// Cheapest valid parameters, for tests and local development only.
    pub fn minimal() -> Self {
        Self {
            memory_cost: Params::MIN_M_COST,
            time_cost: Params::MIN_T_COST,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PasswordService {
    config: Argon2Config,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(Argon2Config::default())
    }
}

impl PasswordService {
    pub fn new(config: Argon2Config) -> Self {
        Self { config }
    }

    pub fn validate_policy(&self, password: &str) -> Result<()> {
        let length = password.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(PlatformError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(PlatformError::validation(format!(
                "Password must be at most {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    /// Hash a password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PlatformError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Validate the policy, then hash.
    pub fn hash_new(&self, password: &str) -> Result<String> {
        self.validate_policy(password)?;
        self.hash(password)
    }

    /// Parameters are read from the stored hash, so hashes made with other
    /// cost settings still verify.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::internal(format!("Invalid password hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            None,
        )
        .map_err(|e| PlatformError::internal(format!("Invalid Argon2 params: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PasswordService {
        PasswordService::new(Argon2Config::minimal())
    }

    #[test]
    fn test_hash_and_verify() {
        let svc = service();
        let hash = svc.hash_new("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(svc.verify("correct horse", &hash).unwrap());
        assert!(!svc.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let svc = service();
        let a = svc.hash("samepassword").unwrap();
        let b = svc.hash("samepassword").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_policy() {
        let svc = service();
        assert!(svc.validate_policy("short").is_err());
        assert!(svc.validate_policy("12345678").is_ok());
        assert!(svc.validate_policy(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(service().verify("anything", "not-a-hash").is_err());
    }
}
