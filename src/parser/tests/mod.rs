//! Test utilities for message parser testing
//!
//! Sample feeds and helpers shared by the parser test modules.

use std::io::Write;
use tempfile::NamedTempFile;

mod edge_case_tests;
mod session_tests;

/// Three ADT messages; the second and third carry short patient segments
pub fn create_test_feed() -> String {
    [
        "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|ELAB-3|20240115103000||ADT^A01|MSG00001|P|2.5",
        "EVN|A01|20240115103000",
        "PID|1||H000004935|H4907|Smith^John||19800101|M|||1 Main St^^Springfield^IL^62701|||||||ACC1001",
        "PV1|1|I|W^389^1",
        "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|ELAB-3|202401161200||ADT^A04|MSG00002|P|2.5",
        "PID|1||H000004936|H4908|Jones^Mary||19751231|F",
        "MSH|^~\\&|ADT1|MERCY CLINIC|GHH LAB|ELAB-3|2024-01-17||ADT^A08|MSG00003|P|2.5",
        "EVN|A08|20240117",
        "PID|1||H000004937||Brown",
        "OBX|1|TX|NOTE||free text",
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file
}

/// Number of lines whose first token is the header code
pub fn count_sentinels(text: &str) -> usize {
    text.lines()
        .filter(|line| line.split('|').next() == Some("MSH"))
        .count()
}
