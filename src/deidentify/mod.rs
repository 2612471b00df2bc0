//! Keyed de-identification of message feeds
//!
//! Where masking blanks patient values out, de-identification replaces them
//! with pseudonyms derived from a keyed digest:
//! - one identity per facility and primary patient identifier, so a patient
//!   keeps the same pseudonym in every message
//! - one account token per account number, shared by PID-18, `AN`
//!   repetitions of PID-3 and the mother's identifier in PID-21, so
//!   newborn records still point at the mother's (pseudonymous) account
//! - one pseudonymous physician per distinct physician value in visit
//!   segments
//!
//! Component counts of replaced values are preserved and every line is kept,
//! so the output partitions into the same records as the input.

pub mod keys;
pub mod physician;
pub mod pseudonym;

pub use keys::PseudonymKey;
pub use physician::{PhysicianMap, is_physician_field};
pub use pseudonym::{PatientPseudonym, preserve_carets};

use chrono::{Datelike, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::config::InspectorConfig;
use crate::constants::header_fields::FACILITY;
use crate::constants::patient_fields::{
    ACCOUNT_NUMBER, ADDRESS, ALIAS, ALTERNATE_ID, BIRTH_DATE, BUSINESS_PHONE, HOME_PHONE,
    MOTHERS_IDENTIFIER, MOTHERS_MAIDEN_NAME, NAME, PATIENT_ID, SEX, SSN,
};
use crate::constants::{
    ACCOUNT_TYPE_CODE, COMPONENT_DELIMITER, FIELD_DELIMITER, HEADER_SEGMENT, PATIENT_SEGMENT,
    REPETITION_DELIMITER, VISIT_SEGMENT,
};
use crate::error::Result;
use crate::masking::{read_feed, write_feed};
use crate::parser::boundary::{BoundaryTracker, LineClass};

/// Address components (0-based) replaced from the pseudonym; street and
/// other designation are cleared, the rest is kept
const ADDRESS_CLEARED: [usize; 2] = [0, 1];
const ADDRESS_CITY: usize = 2;
const ADDRESS_ZIP: usize = 4;

/// Identifier type code component within a PID-3 repetition
const IDENTIFIER_TYPE: usize = 4;

/// Result of de-identifying a feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeidOutcome {
    /// Rewritten feed, one `\n`-terminated line per input line
    #[serde(skip)]
    pub text: String,

    pub messages: usize,

    /// Distinct patient identities
    pub patients: usize,

    /// Distinct account numbers given a token
    pub accounts: usize,

    /// Mother's identifiers that matched an account elsewhere in the feed
    pub mother_links: usize,

    /// Distinct physicians replaced
    pub physicians: usize,

    pub fields_replaced: usize,

    /// Whether digests were keyed with a secret
    pub keyed: bool,
}

/// Mutable lookups carried through one feed
struct FeedState<'a> {
    accounts: &'a BTreeMap<String, String>,
    identities: BTreeMap<String, PatientPseudonym>,
    physicians: PhysicianMap,
    mother_links: usize,
    fields_replaced: usize,
}

/// Rewrites patient and physician values with keyed pseudonyms
#[derive(Debug, Clone)]
pub struct Deidentifier {
    key: PseudonymKey,
    sentinel: String,
    patient_segment: String,
    visit_segment: String,
    reference_year: i32,
}

impl Deidentifier {
    pub fn new(key: PseudonymKey) -> Self {
        Self {
            key,
            sentinel: HEADER_SEGMENT.to_string(),
            patient_segment: PATIENT_SEGMENT.to_string(),
            visit_segment: VISIT_SEGMENT.to_string(),
            reference_year: Local::now().year(),
        }
    }

    pub fn from_config(config: &InspectorConfig, key: PseudonymKey) -> Self {
        Self {
            sentinel: config.sentinel.clone(),
            patient_segment: config.patient_segment.clone(),
            ..Self::new(key)
        }
    }

    /// Year used to cap reported ages (defaults to the current year)
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn key(&self) -> &PseudonymKey {
        &self.key
    }

    /// First pass: every account number referenced by a patient segment,
    /// mapped to its token
    pub fn collect_accounts(&self, text: &str) -> BTreeMap<String, String> {
        let mut tracker = BoundaryTracker::new(&self.sentinel);
        let mut accounts = BTreeMap::new();

        for line in text.lines() {
            if tracker.classify(line) == LineClass::Preamble {
                continue;
            }
            let tokens: Vec<&str> = line.split(FIELD_DELIMITER).collect();
            if tokens.first() != Some(&self.patient_segment.as_str()) {
                continue;
            }
            for account in account_numbers(&tokens) {
                accounts
                    .entry(account.to_string())
                    .or_insert_with(|| self.key.account_token(account));
            }
        }

        debug!("Collected {} account numbers", accounts.len());
        accounts
    }

    /// De-identify a complete feed
    pub fn deidentify_text(&self, text: &str) -> DeidOutcome {
        let accounts = self.collect_accounts(text);
        let mut state = FeedState {
            accounts: &accounts,
            identities: BTreeMap::new(),
            physicians: PhysicianMap::new(self.key.clone()),
            mother_links: 0,
            fields_replaced: 0,
        };

        let mut outcome = DeidOutcome::default();
        let mut tracker = BoundaryTracker::new(&self.sentinel);
        let mut facility = String::new();

        for line in text.lines() {
            let output = match tracker.classify(line) {
                LineClass::Preamble => line.to_string(),
                LineClass::Opens { .. } => {
                    facility = line
                        .split(FIELD_DELIMITER)
                        .nth(FACILITY - 1)
                        .unwrap_or("")
                        .to_string();
                    line.to_string()
                }
                LineClass::Continues => self.rewrite_line(line, &facility, &mut state),
            };
            outcome.text.push_str(&output);
            outcome.text.push('\n');
        }

        outcome.messages = tracker.records_opened();
        outcome.patients = state.identities.len();
        outcome.accounts = accounts.len();
        outcome.mother_links = state.mother_links;
        outcome.physicians = state.physicians.len();
        outcome.fields_replaced = state.fields_replaced;
        outcome.keyed = self.key.is_keyed();

        debug!(
            "De-identified {} messages: {} patients, {} accounts, {} physicians",
            outcome.messages, outcome.patients, outcome.accounts, outcome.physicians
        );
        outcome
    }

    /// De-identify `input` and write the result to `output`
    pub fn deidentify_file(&self, input: &Path, output: &Path) -> Result<DeidOutcome> {
        info!("De-identifying {} -> {}", input.display(), output.display());

        let content = read_feed(input)?;
        let outcome = self.deidentify_text(&content);
        write_feed(output, &outcome.text)?;

        info!(
            "Wrote {} messages with {} replaced fields",
            outcome.messages, outcome.fields_replaced
        );
        Ok(outcome)
    }

    fn rewrite_line(&self, line: &str, facility: &str, state: &mut FeedState<'_>) -> String {
        let mut tokens: Vec<String> = line.split(FIELD_DELIMITER).map(str::to_string).collect();
        let kind = tokens.first().map(String::as_str).unwrap_or("");

        if kind == self.patient_segment {
            self.rewrite_patient(&mut tokens, facility, state);
        } else if kind == self.visit_segment {
            for token in tokens.iter_mut().skip(1) {
                if let Some(replacement) = state.physicians.map_field(token.as_str()) {
                    *token = replacement;
                    state.fields_replaced += 1;
                }
            }
        } else {
            return line.to_string();
        }

        tokens.join(FIELD_DELIMITER.to_string().as_str())
    }

    fn rewrite_patient(&self, tokens: &mut [String], facility: &str, state: &mut FeedState<'_>) {
        let patient_id = primary_identifier(token(tokens, PATIENT_ID));
        let identity_key = self.key.patient_key(facility, &patient_id);
        let sex = token(tokens, SEX).to_string();
        let pseudonym = state
            .identities
            .entry(identity_key.clone())
            .or_insert_with(|| PatientPseudonym::derive(&self.key, &identity_key, &sex))
            .clone();

        let name = pseudonym.name();
        let reference_year = self.reference_year;
        let accounts = state.accounts;
        let account_token = |value: &str| -> String {
            accounts
                .get(value)
                .cloned()
                .unwrap_or_else(|| self.key.account_token(value))
        };

        let rewrites: [(usize, &dyn Fn(&str) -> String); 12] = [
            (PATIENT_ID, &|v: &str| {
                self.rewrite_identifier_list(v, &pseudonym, &account_token)
            }),
            (ALTERNATE_ID, &|v: &str| preserve_carets(v, &pseudonym.alternate_id)),
            (NAME, &|v: &str| preserve_carets(v, &name)),
            (MOTHERS_MAIDEN_NAME, &|v: &str| {
                preserve_carets(v, &pseudonym.mothers_maiden_name)
            }),
            (BIRTH_DATE, &|v: &str| {
                preserve_carets(v, &pseudonym.birth_date(v.trim(), reference_year))
            }),
            (ALIAS, &|v: &str| preserve_carets(v, &name)),
            (ADDRESS, &|v: &str| rewrite_address(v, &pseudonym)),
            (HOME_PHONE, &|v: &str| preserve_carets(v, &pseudonym.home_phone)),
            (BUSINESS_PHONE, &|v: &str| preserve_carets(v, &pseudonym.business_phone)),
            (ACCOUNT_NUMBER, &|v: &str| {
                replace_first_component(v, &account_token(first_component(v)))
            }),
            (SSN, &|v: &str| preserve_carets(v, &pseudonym.ssn)),
            (MOTHERS_IDENTIFIER, &|v: &str| {
                replace_first_component(v, &account_token(first_component(v)))
            }),
        ];

        let mut replaced = 0;
        for (index, rewrite) in rewrites {
            if let Some(value) = tokens.get_mut(index).filter(|v| !v.trim().is_empty()) {
                *value = rewrite(value.as_str());
                replaced += 1;
            }
        }

        if let Some(mother) = tokens
            .get(MOTHERS_IDENTIFIER)
            .map(|v| first_component(v))
            .filter(|v| !v.is_empty())
        {
            // Already rewritten, so a link shows up as a known token
            if accounts.values().any(|known| known == mother) {
                state.mother_links += 1;
            }
        }

        state.fields_replaced += replaced;
    }

    /// Rewrite the patient identifier list: account repetitions get their
    /// account token, the first other repetition gets the record number and
    /// later ones get record numbers derived per repetition
    fn rewrite_identifier_list(
        &self,
        value: &str,
        pseudonym: &PatientPseudonym,
        account_token: &dyn Fn(&str) -> String,
    ) -> String {
        value
            .split(REPETITION_DELIMITER)
            .enumerate()
            .map(|(index, repetition)| {
                let identifier = first_component(repetition);
                if identifier.is_empty() {
                    repetition.to_string()
                } else if is_account_repetition(repetition) {
                    replace_first_component(repetition, &account_token(identifier))
                } else if index == 0 {
                    replace_first_component(repetition, &pseudonym.record_number)
                } else {
                    let label = format!("mrn-{}", index);
                    let number = pseudonym::record_number(&self.key, &pseudonym.key, &label);
                    replace_first_component(repetition, &number)
                }
            })
            .collect::<Vec<_>>()
            .join(REPETITION_DELIMITER.to_string().as_str())
    }
}

fn token(tokens: &[String], index: usize) -> &str {
    tokens.get(index).map(String::as_str).unwrap_or("")
}

/// First component of the first repetition, trimmed
fn primary_identifier(value: &str) -> String {
    let repetition = value.split(REPETITION_DELIMITER).next().unwrap_or("");
    first_component(repetition).to_string()
}

fn first_component(value: &str) -> &str {
    value.split(COMPONENT_DELIMITER).next().unwrap_or("").trim()
}

fn replace_first_component(value: &str, replacement: &str) -> String {
    match value.split_once(COMPONENT_DELIMITER) {
        Some((_, rest)) => format!("{}{}{}", replacement, COMPONENT_DELIMITER, rest),
        None => replacement.to_string(),
    }
}

fn is_account_repetition(repetition: &str) -> bool {
    repetition
        .split(COMPONENT_DELIMITER)
        .nth(IDENTIFIER_TYPE)
        .is_some_and(|code| code.trim().eq_ignore_ascii_case(ACCOUNT_TYPE_CODE))
}

/// Account numbers on one patient segment: PID-18 and `AN` repetitions of
/// PID-3
fn account_numbers<'a>(tokens: &[&'a str]) -> Vec<&'a str> {
    let mut found = Vec::new();
    if let Some(account) = tokens
        .get(ACCOUNT_NUMBER)
        .copied()
        .map(first_component)
        .filter(|v| !v.is_empty())
    {
        found.push(account);
    }
    if let Some(identifiers) = tokens.get(PATIENT_ID).copied() {
        found.extend(
            identifiers
                .split(REPETITION_DELIMITER)
                .filter(|rep| is_account_repetition(rep))
                .map(first_component)
                .filter(|v| !v.is_empty()),
        );
    }
    found
}

fn rewrite_address(value: &str, pseudonym: &PatientPseudonym) -> String {
    let components: Vec<&str> = value
        .split(COMPONENT_DELIMITER)
        .enumerate()
        .map(|(index, component)| {
            if component.trim().is_empty() {
                component
            } else if ADDRESS_CLEARED.contains(&index) {
                ""
            } else if index == ADDRESS_CITY {
                pseudonym.city.as_str()
            } else if index == ADDRESS_ZIP {
                pseudonym.zip_code.as_str()
            } else {
                component
            }
        })
        .collect();
    components.join(COMPONENT_DELIMITER.to_string().as_str())
}
