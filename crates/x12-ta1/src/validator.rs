//! Envelope-level (TA1) validation of a parsed interchange.
//!
//! Runs against both the parsed [`Interchange`] and the raw input: the
//! delimiter self-test must read the raw bytes, because a broken
//! delimiter makes the parsed document unreliable. When any delimiter
//! check fails, the element-level checks are suppressed to avoid
//! cascading noise.

use chrono::NaiveDate;
use x12_types::Interchange;

use crate::codes::Ta1NoteCode;

const SENDER_RECEIVER_QUALIFIERS: [&str; 9] =
    ["01", "14", "20", "27", "28", "29", "30", "33", "ZZ"];

fn add_error(errors: &mut Vec<Ta1NoteCode>, code: Ta1NoteCode) {
    if !errors.contains(&code) {
        errors.push(code);
    }
}

/// Validate the ISA/IEA envelope of a parsed interchange.
///
/// Returns the note codes of every distinct envelope error found, in
/// detection order (at most one occurrence per code). An empty list
/// means the envelope is acceptable.
pub fn validate_interchange_envelope(
    interchange: &Interchange,
    raw: &str,
) -> Vec<Ta1NoteCode> {
    let mut errors = Vec::new();

    // Delimiter and structural checks run on the raw input first.
    let clean = raw.trim();
    let bytes = clean.as_bytes();
    if !(clean.starts_with("ISA") && bytes.len() >= 106) {
        add_error(&mut errors, Ta1NoteCode::InvalidControlStructure);
        return errors;
    }

    let element_sep = bytes[3] as char;
    let component_sep = bytes[104] as char;
    let segment_term = bytes[105] as char;

    if element_sep.is_alphanumeric() || element_sep == '\r' || element_sep == '\n' {
        add_error(&mut errors, Ta1NoteCode::InvalidElementSeparator);
    }
    if segment_term.is_alphanumeric() {
        add_error(&mut errors, Ta1NoteCode::InvalidSegmentTerminator);
    }
    if component_sep.is_alphanumeric() {
        add_error(&mut errors, Ta1NoteCode::InvalidComponentSeparator);
    }

    // With a broken delimiter the parsed interchange cannot be trusted
    // for element checks.
    if !errors.is_empty() {
        return errors;
    }

    if interchange.header.elements.is_empty() || interchange.trailer.elements.is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidControlStructure);
        return errors;
    }

    let isa = &interchange.header;
    let iea = &interchange.trailer;

    if isa.element(13).trim() != iea.element(2).trim() {
        add_error(&mut errors, Ta1NoteCode::IcnMismatch);
    }

    if !SENDER_RECEIVER_QUALIFIERS.contains(&isa.element(5).trim()) {
        add_error(&mut errors, Ta1NoteCode::InvalidSenderIdQualifier);
    }
    if isa.element(6).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidSenderId);
    }

    if !SENDER_RECEIVER_QUALIFIERS.contains(&isa.element(7).trim()) {
        add_error(&mut errors, Ta1NoteCode::InvalidReceiverIdQualifier);
    }
    if isa.element(8).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidReceiverId);
    }

    let auth_qualifier = isa.element(1).trim();
    if !["00", "03"].contains(&auth_qualifier) {
        add_error(&mut errors, Ta1NoteCode::InvalidAuthQualifier);
    }
    if auth_qualifier == "03" && isa.element(2).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidAuthValue);
    }
    if auth_qualifier == "00" && !isa.element(2).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidAuthValue);
    }

    let security_qualifier = isa.element(3).trim();
    if !["00", "01"].contains(&security_qualifier) {
        add_error(&mut errors, Ta1NoteCode::InvalidSecurityQualifier);
    }
    if security_qualifier == "01" && isa.element(4).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidSecurityValue);
    }
    if security_qualifier == "00" && !isa.element(4).trim().is_empty() {
        add_error(&mut errors, Ta1NoteCode::InvalidSecurityValue);
    }

    if !yymmdd_ok(isa.element(9)) {
        add_error(&mut errors, Ta1NoteCode::InvalidInterchangeDate);
    }
    if !hhmm_ok(isa.element(10)) {
        add_error(&mut errors, Ta1NoteCode::InvalidInterchangeTime);
    }

    if isa.element(11) != "^" {
        add_error(&mut errors, Ta1NoteCode::InvalidStandardsId);
    }
    let version = isa.element(12);
    if version.len() != 5 || !version.bytes().all(|b| b.is_ascii_digit()) {
        add_error(&mut errors, Ta1NoteCode::InvalidVersionId);
    }

    let icn = isa.element(13).trim();
    if icn.len() != 9 || !icn.bytes().all(|b| b.is_ascii_digit()) {
        add_error(&mut errors, Ta1NoteCode::InvalidControlNumber);
    }

    if !["0", "1"].contains(&isa.element(14)) {
        add_error(&mut errors, Ta1NoteCode::InvalidAcknowledgmentRequested);
    }
    if !["T", "P"].contains(&isa.element(15)) {
        add_error(&mut errors, Ta1NoteCode::InvalidTestIndicator);
    }

    match iea.element(1).trim().parse::<usize>() {
        Ok(count) if count == interchange.functional_groups.len() => {}
        _ => add_error(&mut errors, Ta1NoteCode::InvalidGroupCount),
    }

    errors
}

fn yymmdd_ok(value: &str) -> bool {
    value.len() == 6
        && value.bytes().all(|b| b.is_ascii_digit())
        && NaiveDate::parse_from_str(value, "%y%m%d").is_ok()
}

fn hhmm_ok(value: &str) -> bool {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let hour: u32 = value[..2].parse().unwrap_or(99);
    let minute: u32 = value[2..].parse().unwrap_or(99);
    hour <= 23 && minute <= 59
}
