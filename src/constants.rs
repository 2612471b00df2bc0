//! Application constants for the HL7 inspector
//!
//! Segment codes, field positions, delimiters and defaults shared by the
//! parser, the redacted block store and the CLI.

// =============================================================================
// Wire Format
// =============================================================================

/// Field delimiter within a segment line
pub const FIELD_DELIMITER: char = '|';

/// Component delimiter used inside composite fields (patient name)
pub const COMPONENT_DELIMITER: char = '^';

/// Separates repetitions of a repeating field (patient identifier list)
pub const REPETITION_DELIMITER: char = '~';

/// Segment type that opens every message record
pub const HEADER_SEGMENT: &str = "MSH";

/// Segment type carrying patient identification
pub const PATIENT_SEGMENT: &str = "PID";

/// Segment type carrying visit and attending physician details
pub const VISIT_SEGMENT: &str = "PV1";

// =============================================================================
// Field Positions
// =============================================================================

/// Header field numbers, using wire-format numbering where the field
/// separator itself is MSH-1.
pub mod header_fields {
    /// Sending facility
    pub const FACILITY: usize = 4;

    /// Date/time of message
    pub const TIMESTAMP: usize = 7;

    /// Message type (e.g. `ADT^A01`)
    pub const MESSAGE_TYPE: usize = 9;

    /// Message control id
    pub const CONTROL_ID: usize = 10;
}

/// Patient identification field numbers
pub mod patient_fields {
    /// Patient identifier list
    pub const PATIENT_ID: usize = 3;

    /// Patient name (`last^first^...`)
    pub const NAME: usize = 5;

    /// Patient account number
    pub const ACCOUNT_NUMBER: usize = 18;

    pub const ALTERNATE_ID: usize = 4;
    pub const MOTHERS_MAIDEN_NAME: usize = 6;
    pub const BIRTH_DATE: usize = 7;

    /// Administrative sex (`M`, `F`, ...)
    pub const SEX: usize = 8;

    pub const ALIAS: usize = 9;

    /// Address (`street^other^city^state^zip^country`)
    pub const ADDRESS: usize = 11;

    pub const HOME_PHONE: usize = 13;
    pub const BUSINESS_PHONE: usize = 14;
    pub const SSN: usize = 19;

    /// Mother's identifier; holds the mother's account number on newborn records
    pub const MOTHERS_IDENTIFIER: usize = 21;
}

// =============================================================================
// Timestamp Normalization
// =============================================================================

/// Accepted digit-prefix lengths, longest first, with their formats
pub const TIMESTAMP_FORMATS: &[(usize, &str)] = &[
    (14, "%Y%m%d%H%M%S"),
    (12, "%Y%m%d%H%M"),
    (8, "%Y%m%d"),
];

/// Minimum digit count for a timestamp to be interpretable
pub const MIN_TIMESTAMP_DIGITS: usize = 8;

// =============================================================================
// Redaction and Reporting Defaults
// =============================================================================

/// PID fields masked when producing a redacted counterpart file
pub const DEFAULT_MASKED_PATIENT_FIELDS: &[usize] = &[3, 4, 5, 7, 9, 11, 12, 13, 14, 18, 19];

/// Character used to mask redacted field content
pub const MASK_CHAR: char = '*';

/// Fields checked by the presence report when none are given
pub const DEFAULT_PRESENCE_FIELDS: &[&str] = &[
    "PID-3", "PID-4", "PID-5", "PID-11", "PID-12", "PID-7", "PID-13", "PID-14", "PID-6", "PID-9",
    "PID-18", "PID-19", "PID-20", "PID-23", "PID-29", "PID-30",
];

/// Identifier given to the first message of a parse session
pub const DEFAULT_FIRST_MESSAGE_ID: u64 = 1;

/// Rows per page for message listings
pub const DEFAULT_PAGE_SIZE: usize = 25;

// =============================================================================
// De-identification
// =============================================================================

/// Identifier type code marking an account number repetition of PID-3
pub const ACCOUNT_TYPE_CODE: &str = "AN";

/// Prefix and digit count of pseudonymous account numbers
pub const ACCOUNT_PREFIX: &str = "H";
pub const ACCOUNT_DIGITS: u32 = 11;

/// Digit count of pseudonymous medical record numbers
pub const RECORD_NUMBER_DIGITS: u32 = 10;

/// Ages at or above this are reported as exactly this many years
pub const MAX_REPORTED_AGE: i32 = 90;

/// Trailing role codes that mark a visit field as a physician
pub const PHYSICIAN_ROLE_CODES: &[&str] = &["MD", "DO", "DR"];

/// Minimum component count of a physician field
pub const PHYSICIAN_MIN_COMPONENTS: usize = 4;

/// Length of pseudonymous physician identifiers
pub const PHYSICIAN_ID_LENGTH: usize = 5;

/// Environment variable holding the pseudonym secret
pub const ENV_PSEUDONYM_SECRET: &str = "HL7_INSPECTOR_SECRET";

/// Replacement surnames
pub const SURNAMES: &[&str] = &[
    "Abbott", "Barker", "Calloway", "Dalton", "Ellison", "Fairbanks", "Garrison", "Holloway",
    "Ingram", "Jennings", "Kendall", "Lawson", "Mercer", "Norwood", "Oakley", "Prescott",
    "Quinlan", "Radcliffe", "Sheffield", "Thornton", "Underwood", "Vance", "Whitaker", "Yardley",
];

pub const GIVEN_NAMES_FEMALE: &[&str] = &[
    "Alice", "Beatrice", "Clara", "Diana", "Eleanor", "Fiona", "Grace", "Helen", "Irene", "Julia",
    "Katherine", "Lucy", "Margaret", "Nora", "Olivia", "Paula",
];

pub const GIVEN_NAMES_MALE: &[&str] = &[
    "Albert", "Bernard", "Charles", "Daniel", "Edward", "Frank", "George", "Henry", "Isaac",
    "James", "Kenneth", "Louis", "Martin", "Neil", "Oscar", "Peter",
];

/// Replacement city names; the original state is kept
pub const CITIES: &[&str] = &[
    "Ashford", "Brookville", "Cedar Falls", "Dunmore", "Eastwood", "Fairview", "Glenwood",
    "Hillcrest", "Lakeside", "Maplewood", "Northfield", "Riverton",
];

// =============================================================================
// Configuration Discovery
// =============================================================================

/// Application directory name under the user config directory
pub const APP_NAME: &str = "hl7-inspector";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit configuration file
pub const ENV_CONFIG_PATH: &str = "HL7_INSPECTOR_CONFIG";
