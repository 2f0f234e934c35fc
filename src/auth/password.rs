use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

/// One-way password hashing.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, plain: &str) -> anyhow::Result<String>;
    /// Whether `value` has the shape of a hash this encoder produces.
    fn is_encoded(&self, value: &str) -> bool;
    /// `false` for a mismatch and for a stored value that is not a valid hash.
    fn matches(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id encoder producing PHC strings.
#[derive(Clone, Default)]
pub struct Argon2Encoder {
    argon2: Argon2<'static>,
}

impl Argon2Encoder {
    /// Encoder with explicit cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow::anyhow!("argon2 params: {}", e))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordEncoder for Argon2Encoder {
    fn encode(&self, plain: &str) -> anyhow::Result<String> {
        hash_password(&self.argon2, plain)
    }

    fn is_encoded(&self, value: &str) -> bool {
        PasswordHash::new(value).is_ok()
    }

    fn matches(&self, plain: &str, hash: &str) -> bool {
        match verify_password(&self.argon2, plain, hash) {
            Ok(ok) => ok,
            Err(e) => {
                debug!(error = %e, "stored password is not an argon2 hash");
                false
            }
        }
    }
}

fn hash_password(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_password(argon2: &Argon2<'_>, plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(argon2.verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
pub(crate) fn cheap_encoder() -> Argon2Encoder {
    Argon2Encoder::with_params(8, 1, 1).expect("valid argon2 params")
}
