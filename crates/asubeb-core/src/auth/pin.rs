use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use tracing::{info, warn};

/// PINs are short numeric codes.
const MIN_PIN_LENGTH: usize = 4;
const MAX_PIN_LENGTH: usize = 8;

/// Bytes of randomness in a session token (hex-encoded to twice this length)
const TOKEN_BYTES: usize = 24;

/// Checks a PIN against the configured Argon2 hash.
pub struct PinGate {
    hash: String,
}

impl PinGate {
    /// Validates that `hash` is a PHC string before accepting it.
    pub fn new(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        PasswordHash::new(&hash).map_err(|e| anyhow!("Invalid PIN hash in config: {}", e))?;
        Ok(Self { hash })
    }

    pub fn validate_format(pin: &str) -> Result<()> {
        let len = pin.chars().count();
        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) {
            return Err(anyhow!(
                "PIN must be {}-{} digits",
                MIN_PIN_LENGTH,
                MAX_PIN_LENGTH
            ));
        }
        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("PIN must contain only digits"));
        }
        Ok(())
    }

    /// Hash a new PIN with a random salt, for storing in the config file.
    pub fn hash_pin(pin: &str) -> Result<String> {
        Self::validate_format(pin)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash PIN: {}", e))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, pin: &str) -> bool {
        let parsed = match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored PIN hash is unreadable");
                return false;
            }
        };
        Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok()
    }

    /// Verify the PIN and issue a fresh session token on success.
    pub fn unlock(&self, pin: &str) -> Result<String> {
        if !self.verify(pin) {
            warn!("Incorrect PIN entered");
            return Err(anyhow!("Incorrect PIN"));
        }
        info!("PIN accepted");
        Ok(generate_token())
    }
}

pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
