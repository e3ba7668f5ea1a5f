//! Password hashing.
//!
//! - [`Argon2Hasher`]: Argon2id, used for new passwords by default
//! - [`Pbkdf2Hasher`]: PBKDF2-HMAC-SHA256 in the `pbkdf2_sha256$iter$salt$hash`
//!   format, so hashes imported from an existing Django user table verify
//!
//! Hashing and verification run in `tokio::task::spawn_blocking`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use taxi_core::{Settings, TaxiError, TaxiResult};

/// Prefix marking a password that can never match.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

const PBKDF2_ALGORITHM: &str = "pbkdf2_sha256";
const PBKDF2_SALT_LEN: usize = 22;

/// A password hashing backend.
#[async_trait]
pub trait PasswordHasher: Send + Sync + std::fmt::Debug {
    /// Returns the algorithm identifier (`"argon2"`, `"pbkdf2_sha256"`).
    fn algorithm(&self) -> &'static str;

    /// Hashes `password` into a self-describing encoded string.
    async fn hash(&self, password: &str) -> TaxiResult<String>;

    /// Returns `true` if `password` matches `encoded`.
    async fn verify(&self, password: &str, encoded: &str) -> TaxiResult<bool>;
}

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    fn algorithm(&self) -> &'static str {
        "argon2"
    }

    async fn hash(&self, password: &str) -> TaxiResult<String> {
        let password = password.to_string();
        run_blocking(move || {
            use argon2::password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString};
            use argon2::Argon2;

            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| TaxiError::PasswordHashing(format!("argon2 hash failed: {e}")))
        })
        .await
    }

    async fn verify(&self, password: &str, encoded: &str) -> TaxiResult<bool> {
        let password = password.to_string();
        let encoded = encoded.to_string();
        run_blocking(move || {
            use argon2::password_hash::{Error, PasswordHash, PasswordVerifier};
            use argon2::Argon2;

            let parsed = PasswordHash::new(&encoded)
                .map_err(|e| TaxiError::PasswordHashing(format!("invalid argon2 hash: {e}")))?;
            if parsed.hash.is_none() {
                return Err(TaxiError::PasswordHashing(
                    "invalid argon2 hash: missing hash output".into(),
                ));
            }
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(Error::Password) => Ok(false),
                Err(e) => Err(TaxiError::PasswordHashing(format!("argon2 verify failed: {e}"))),
            }
        })
        .await
    }
}

/// PBKDF2-HMAC-SHA256 hasher.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Hasher {
    /// Number of PBKDF2 iterations for new hashes.
    pub iterations: u32,
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self {
            iterations: 600_000,
        }
    }
}

impl Pbkdf2Hasher {
    /// Encodes `password` with an explicit salt.
    ///
    /// The salt must not contain `$`.
    pub fn encode(&self, password: &str, salt: &str) -> TaxiResult<String> {
        if salt.contains('$') {
            return Err(TaxiError::PasswordHashing("salt must not contain '$'".into()));
        }
        let derived = pbkdf2_sha256(password.as_bytes(), salt.as_bytes(), self.iterations)?;
        let hash = base64::engine::general_purpose::STANDARD.encode(derived);
        Ok(format!("{PBKDF2_ALGORITHM}${}${salt}${hash}", self.iterations))
    }
}

#[async_trait]
impl PasswordHasher for Pbkdf2Hasher {
    fn algorithm(&self) -> &'static str {
        PBKDF2_ALGORITHM
    }

    async fn hash(&self, password: &str) -> TaxiResult<String> {
        use rand::distributions::{Alphanumeric, DistString};

        let password = password.to_string();
        let hasher = *self;
        run_blocking(move || {
            let salt = Alphanumeric.sample_string(&mut rand::thread_rng(), PBKDF2_SALT_LEN);
            hasher.encode(&password, &salt)
        })
        .await
    }

    async fn verify(&self, password: &str, encoded: &str) -> TaxiResult<bool> {
        let password = password.to_string();
        let encoded = encoded.to_string();
        run_blocking(move || {
            let mut parts = encoded.splitn(4, '$');
            let (Some(PBKDF2_ALGORITHM), Some(iterations), Some(salt), Some(expected)) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Ok(false);
            };
            let iterations: u32 = iterations.parse().map_err(|_| {
                TaxiError::PasswordHashing(format!("invalid iteration count: {iterations}"))
            })?;
            let derived = pbkdf2_sha256(password.as_bytes(), salt.as_bytes(), iterations)?;
            let computed = base64::engine::general_purpose::STANDARD.encode(derived);
            Ok(constant_time_eq(computed.as_bytes(), expected.as_bytes()))
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> TaxiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> TaxiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TaxiError::Internal(format!("hashing task failed: {e}")))?
}

/// PBKDF2 (RFC 8018) with HMAC-SHA256 and a 32-byte output.
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> TaxiResult<[u8; 32]> {
    let new_mac = || {
        Hmac::<Sha256>::new_from_slice(password)
            .map_err(|e| TaxiError::PasswordHashing(format!("invalid hmac key: {e}")))
    };

    // One block suffices: the output length equals the SHA-256 digest size.
    let mut mac = new_mac()?;
    mac.update(salt);
    mac.update(&1_u32.to_be_bytes());
    let mut u = mac.finalize().into_bytes();
    let mut output = [0_u8; 32];
    output.copy_from_slice(&u);

    for _ in 1..iterations {
        let mut mac = new_mac()?;
        mac.update(&u);
        u = mac.finalize().into_bytes();
        for (out, byte) in output.iter_mut().zip(u.iter()) {
            *out ^= byte;
        }
    }
    Ok(output)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Returns the hasher named by `algorithm`.
pub fn hasher_for(algorithm: &str, pbkdf2_iterations: u32) -> TaxiResult<Arc<dyn PasswordHasher>> {
    match algorithm {
        "argon2" => Ok(Arc::new(Argon2Hasher)),
        PBKDF2_ALGORITHM => Ok(Arc::new(Pbkdf2Hasher {
            iterations: pbkdf2_iterations,
        })),
        other => Err(TaxiError::Configuration(format!(
            "unknown password hasher: {other}"
        ))),
    }
}

/// Returns the hasher configured by `settings.password_hasher`.
pub fn hasher_from_settings(settings: &Settings) -> TaxiResult<Arc<dyn PasswordHasher>> {
    hasher_for(&settings.password_hasher, settings.pbkdf2_iterations)
}

fn identify_hasher(encoded: &str) -> Option<Arc<dyn PasswordHasher>> {
    if encoded.starts_with("$argon2") {
        Some(Arc::new(Argon2Hasher))
    } else if encoded.starts_with("pbkdf2_sha256$") {
        Some(Arc::new(Pbkdf2Hasher::default()))
    } else {
        None
    }
}

/// Hashes `password` with Argon2id.
pub async fn make_password(password: &str) -> TaxiResult<String> {
    Argon2Hasher.hash(password).await
}

/// Hashes `password` with the given hasher.
pub async fn make_password_with(hasher: &dyn PasswordHasher, password: &str) -> TaxiResult<String> {
    hasher.hash(password).await
}

/// Checks `password` against an encoded hash of any supported algorithm.
///
/// Unusable hashes never match. A hash in an unknown format is an error.
pub async fn check_password(password: &str, encoded: &str) -> TaxiResult<bool> {
    if !is_password_usable(encoded) {
        return Ok(false);
    }
    let hasher = identify_hasher(encoded).ok_or_else(|| {
        TaxiError::PasswordHashing(format!(
            "unknown password hashing algorithm for hash: {}",
            encoded.chars().take(20).collect::<String>()
        ))
    })?;
    hasher.verify(password, encoded).await
}

/// Returns `false` for empty hashes and hashes marked unusable.
pub fn is_password_usable(encoded: &str) -> bool {
    !encoded.is_empty() && !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX)
}
