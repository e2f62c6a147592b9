//! Salted, iterated SHA-256 password hashing.
//!
//! Encoded form: `sha256$<iterations>$<salt-hex>$<digest-hex>`.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::domain::PasswordHasher;

const SCHEME: &str = "sha256";
pub const DEFAULT_ITERATIONS: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct Sha256PasswordHasher {
    iterations: u32,
}

impl Default for Sha256PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl Sha256PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn digest(password: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        let mut digest = hasher.finalize();
        for _ in 1..iterations {
            let mut hasher = Sha256::new();
            hasher.update(salt);
            hasher.update(digest);
            digest = hasher.finalize();
        }
        digest.to_vec()
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> String {
        let salt: [u8; 16] = rand::thread_rng().r#gen();
        let digest = Self::digest(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        let parts: Vec<&str> = encoded.split('$').collect();
        let [scheme, iterations, salt, expected] = parts.as_slice() else {
            return false;
        };
        if *scheme != SCHEME {
            return false;
        }
        let (Ok(iterations), Ok(salt), Ok(expected)) =
            (iterations.parse::<u32>(), hex::decode(salt), hex::decode(expected))
        else {
            return false;
        };
        let actual = Self::digest(password, &salt, iterations.max(1));
        // constant-time comparison
        actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected.iter())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}
