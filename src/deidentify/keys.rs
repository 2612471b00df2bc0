//! Keyed hashing for pseudonym derivation
//!
//! Every replacement value is a function of a SHA-256 digest, or of an
//! HMAC-SHA256 digest when a secret is supplied. The same input always maps
//! to the same output, which keeps a patient's pseudonym stable across
//! messages and across runs that share the secret.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::{ACCOUNT_DIGITS, ACCOUNT_PREFIX};
use crate::error::{Hl7Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 output size in bytes
pub const DIGEST_LEN: usize = 32;

/// Source of deterministic digests for pseudonym derivation
#[derive(Clone)]
pub struct PseudonymKey {
    mac: Option<HmacSha256>,
}

impl fmt::Debug for PseudonymKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudonymKey")
            .field("keyed", &self.is_keyed())
            .finish()
    }
}

impl PseudonymKey {
    /// Plain SHA-256 digests
    pub fn unkeyed() -> Self {
        Self { mac: None }
    }

    /// HMAC-SHA256 digests under `secret`
    pub fn with_secret(secret: &str) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| Hl7Error::configuration(format!("Invalid pseudonym secret: {}", e)))?;
        Ok(Self { mac: Some(mac) })
    }

    /// Keyed when a non-empty secret is given, unkeyed otherwise
    pub fn from_secret(secret: Option<&str>) -> Result<Self> {
        match secret.filter(|s| !s.is_empty()) {
            Some(secret) => Self::with_secret(secret),
            None => Ok(Self::unkeyed()),
        }
    }

    pub fn is_keyed(&self) -> bool {
        self.mac.is_some()
    }

    pub fn digest(&self, input: &str) -> [u8; DIGEST_LEN] {
        let mut out = [0u8; DIGEST_LEN];
        match &self.mac {
            Some(mac) => {
                let mut mac = mac.clone();
                mac.update(input.as_bytes());
                out.copy_from_slice(&mac.finalize().into_bytes());
            }
            None => out.copy_from_slice(&Sha256::digest(input.as_bytes())),
        }
        out
    }

    /// Digest of `label` within `scope`, so one identity yields independent
    /// values per field
    pub fn derive(&self, scope: &str, label: &str) -> [u8; DIGEST_LEN] {
        self.digest(&format!("{}:{}", scope, label))
    }

    /// Hex identity key for a patient at a facility
    pub fn patient_key(&self, facility: &str, patient_id: &str) -> String {
        hex::encode(self.digest(&format!("{}-{}", facility, patient_id)))
    }

    /// Pseudonymous account number: prefix plus the digest reduced to a
    /// fixed number of decimal digits
    pub fn account_token(&self, account: &str) -> String {
        let value = reduce(&self.digest(account), 10u64.pow(ACCOUNT_DIGITS));
        format!(
            "{}{:0width$}",
            ACCOUNT_PREFIX,
            value,
            width = ACCOUNT_DIGITS as usize
        )
    }
}

/// Big-endian digest value modulo `modulus` (which must stay below 2^56)
pub fn reduce(bytes: &[u8], modulus: u64) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc * 256 + u64::from(b)) % modulus)
}

/// Pick an element of `pool` from a digest
pub fn pick<'a>(bytes: &[u8], pool: &[&'a str]) -> &'a str {
    pool.get(reduce(bytes, pool.len().max(1) as u64) as usize)
        .copied()
        .unwrap_or("")
}
