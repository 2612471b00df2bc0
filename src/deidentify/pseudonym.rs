//! Patient pseudonyms and component-preserving replacement

use chrono::NaiveDate;
use serde::Serialize;

use super::keys::{PseudonymKey, pick, reduce};
use crate::constants::{
    CITIES, COMPONENT_DELIMITER, GIVEN_NAMES_FEMALE, GIVEN_NAMES_MALE, MAX_REPORTED_AGE,
    RECORD_NUMBER_DIGITS, SURNAMES,
};

/// Fallback birth year when the original date has no readable year
const FALLBACK_BIRTH_YEAR: i32 = 1970;

/// Replacement values for one patient identity.
///
/// Every value is derived from the identity key, so the same patient at the
/// same facility receives the same pseudonym in every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientPseudonym {
    pub key: String,
    pub record_number: String,
    pub alternate_id: String,
    pub last_name: String,
    pub first_name: String,
    pub mothers_maiden_name: String,
    pub city: String,
    pub zip_code: String,
    pub home_phone: String,
    pub business_phone: String,
    pub ssn: String,
    birth_seed: u64,
}

impl PatientPseudonym {
    /// Derive the pseudonym for `identity_key`; `sex` selects the given-name pool
    pub fn derive(key: &PseudonymKey, identity_key: &str, sex: &str) -> Self {
        let field = |label: &str| key.derive(identity_key, label);
        let digits = |label: &str, count: u32| {
            format!(
                "{:0width$}",
                reduce(&field(label), 10u64.pow(count)),
                width = count as usize
            )
        };

        let given_names = match sex.trim().to_ascii_uppercase().as_str() {
            "M" => GIVEN_NAMES_MALE,
            "F" => GIVEN_NAMES_FEMALE,
            _ if reduce(&field("given-pool"), 2) == 0 => GIVEN_NAMES_MALE,
            _ => GIVEN_NAMES_FEMALE,
        };

        let letter = char::from(b'A' + reduce(&field("alt-letter"), 26) as u8);

        Self {
            key: identity_key.to_string(),
            record_number: record_number(key, identity_key, "mrn"),
            alternate_id: format!("{}{}", letter, 1000 + reduce(&field("alt"), 9000)),
            last_name: pick(&field("last"), SURNAMES).to_string(),
            first_name: pick(&field("first"), given_names).to_string(),
            mothers_maiden_name: pick(&field("maiden"), SURNAMES).to_string(),
            city: pick(&field("city"), CITIES).to_string(),
            zip_code: digits("zip", 5),
            home_phone: format!("555-{}-{}", digits("home-exchange", 3), digits("home-line", 4)),
            business_phone: format!("555-{}-{}", digits("work-exchange", 3), digits("work-line", 4)),
            ssn: format!(
                "9{}-{}-{}",
                digits("ssn-area", 2),
                digits("ssn-group", 2),
                digits("ssn-serial", 4)
            ),
            birth_seed: reduce(&field("birth"), 1 << 32),
        }
    }

    /// `last^first` name value
    pub fn name(&self) -> String {
        format!("{}{}{}", self.last_name, COMPONENT_DELIMITER, self.first_name)
    }

    /// Replacement birth date (`YYYYMMDD`).
    ///
    /// The year of `original` is kept, capped so the implied age never
    /// exceeds the reporting ceiling as of `reference_year`. Month and day
    /// come from the pseudonym.
    pub fn birth_date(&self, original: &str, reference_year: i32) -> String {
        let mut year = original
            .get(..4)
            .and_then(|y| y.parse::<i32>().ok())
            .unwrap_or(FALLBACK_BIRTH_YEAR);
        if reference_year - year >= MAX_REPORTED_AGE {
            year = reference_year - MAX_REPORTED_AGE;
        }

        let month = (self.birth_seed % 12) as u32 + 1;
        let day = ((self.birth_seed / 12) % u64::from(days_in_month(year, month))) as u32 + 1;
        format!("{:04}{:02}{:02}", year, month, day)
    }
}

/// Ten-digit record number with no leading zero, derived from `label`
/// within an identity
pub fn record_number(key: &PseudonymKey, identity_key: &str, label: &str) -> String {
    let lowest = 10u64.pow(RECORD_NUMBER_DIGITS - 1);
    (lowest + reduce(&key.derive(identity_key, label), 9 * lowest)).to_string()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(28)
}

/// Replace a composite value while keeping at least as many components as
/// the original
pub fn preserve_carets(original: &str, replacement: &str) -> String {
    let wanted = original.split(COMPONENT_DELIMITER).count();
    let mut components: Vec<&str> = replacement.split(COMPONENT_DELIMITER).collect();
    if components.len() < wanted {
        components.resize(wanted, "");
    }
    components.join(COMPONENT_DELIMITER.to_string().as_str())
}
