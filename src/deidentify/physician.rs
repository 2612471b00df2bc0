//! Consistent replacement of physician fields in visit segments

use std::collections::BTreeMap;

use super::keys::{PseudonymKey, pick, reduce};
use crate::constants::{
    COMPONENT_DELIMITER, GIVEN_NAMES_FEMALE, GIVEN_NAMES_MALE, PHYSICIAN_ID_LENGTH,
    PHYSICIAN_MIN_COMPONENTS, PHYSICIAN_ROLE_CODES, SURNAMES,
};

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Whether a field value looks like a physician (`id^last^first^...^MD`)
pub fn is_physician_field(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    let components: Vec<&str> = value.split(COMPONENT_DELIMITER).collect();
    components.len() >= PHYSICIAN_MIN_COMPONENTS
        && components.last().is_some_and(|role| {
            PHYSICIAN_ROLE_CODES
                .iter()
                .any(|code| role.eq_ignore_ascii_case(code))
        })
}

/// Maps each distinct physician value to one pseudonymous physician
#[derive(Debug, Clone)]
pub struct PhysicianMap {
    key: PseudonymKey,
    mapping: BTreeMap<String, String>,
}

impl PhysicianMap {
    pub fn new(key: PseudonymKey) -> Self {
        Self {
            key,
            mapping: BTreeMap::new(),
        }
    }

    /// Replacement for `value`, or `None` when it is not a physician field
    pub fn map_field(&mut self, value: &str) -> Option<String> {
        if !is_physician_field(value) {
            return None;
        }
        if let Some(existing) = self.mapping.get(value) {
            return Some(existing.clone());
        }

        let replacement = self.derive(value);
        self.mapping.insert(value.to_string(), replacement.clone());
        Some(replacement)
    }

    /// Distinct physicians seen so far
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    fn derive(&self, value: &str) -> String {
        let role = value.rsplit(COMPONENT_DELIMITER).next().unwrap_or("");
        let field = |label: &str| self.key.derive(value, label);

        let id_digest = field("physician-id");
        let id: String = id_digest
            .iter()
            .take(PHYSICIAN_ID_LENGTH)
            .map(|&b| char::from(ID_ALPHABET[usize::from(b) % ID_ALPHABET.len()]))
            .collect();

        let given_names = if reduce(&field("physician-pool"), 2) == 0 {
            GIVEN_NAMES_MALE
        } else {
            GIVEN_NAMES_FEMALE
        };
        let last = pick(&field("physician-last"), SURNAMES);
        let first = pick(&field("physician-first"), given_names);
        let initial: String = first.chars().take(1).collect();

        format!("{id}^{last}^{first}^{initial}^^^{role}")
    }
}
