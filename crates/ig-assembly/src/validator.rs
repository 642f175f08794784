//! Segment validation against effective (base + contextual) definitions.
//!
//! The validator is consulted from two sites: during the matcher's trial
//! selection, where only identifier-flagged findings matter, and after a
//! segment is committed to a loop, where all findings attach to it.

use chrono::NaiveDate;
use ig_schema::{
    effective_definition, AssertionClause, AssertionKind, BaseElement, ConditionClause,
    ConditionOperator, Conditions, DataType, GuideSchema, SegmentDefinition, Usage,
};
use tracing::{debug, warn};
use x12_types::{Finding, Segment};

/// Validates one segment at a time against the loaded guide schema.
pub struct SegmentValidator<'a> {
    schema: &'a GuideSchema,
    component_separator: char,
}

impl<'a> SegmentValidator<'a> {
    pub fn new(schema: &'a GuideSchema, component_separator: char) -> Self {
        Self {
            schema,
            component_separator,
        }
    }

    /// Validate a segment under an optional contextual definition.
    ///
    /// Findings raised against identifier elements carry
    /// `is_identifier_error = true`; the matcher reads that flag as
    /// "wrong context" during trial validation.
    pub fn validate(&self, segment: &Segment, context_id: Option<&str>) -> Vec<Finding> {
        debug!(
            segment = %segment.raw,
            context = context_id.unwrap_or("base definition"),
            "validating segment"
        );

        let Some(base) = self.schema.segment_definition(&segment.id) else {
            warn!(segment_id = %segment.id, line = segment.line, "base definition not found");
            return vec![Finding::new(format!(
                "Base definition for segment '{}' not found in schema.",
                segment.id
            ))];
        };
        let context = context_id.and_then(|id| self.schema.contextual_definition(id));
        let effective = effective_definition(base, context);

        let mut findings = Vec::new();
        for element_def in &effective.elements {
            if element_def.seq == 0 {
                continue;
            }
            let value = segment.element(element_def.seq);
            self.validate_element(element_def, value, None, &mut findings);
        }
        self.validate_syntax_rules(segment, &effective, &mut findings);
        findings
    }

    fn validate_element(
        &self,
        element_def: &BaseElement,
        value: &str,
        parent_xid: Option<&str>,
        findings: &mut Vec<Finding>,
    ) {
        let full_xid = match parent_xid {
            Some(parent) => format!("{parent}-{}", element_def.xid),
            None => element_def.xid.clone(),
        };
        let is_present = !value.is_empty();
        let is_identifier = element_def.is_identifier;

        if element_def.usage == Usage::R && !is_present {
            findings.push(Finding::for_element(
                format!("Required element '{full_xid}' is missing."),
                full_xid,
                is_identifier,
            ));
            return;
        }

        if element_def.usage == Usage::N && is_present {
            findings.push(Finding::for_element(
                format!("Element '{full_xid}' is Not Used and should not contain data."),
                full_xid.clone(),
                is_identifier,
            ));
        }

        if !is_present {
            return;
        }

        if element_def.data_type == DataType::Composite {
            let components: Vec<&str> = value.split(self.component_separator).collect();
            if let Some(sub_defs) = &element_def.sub_elements {
                for sub_def in sub_defs {
                    if sub_def.seq == 0 {
                        continue;
                    }
                    let sub_value = components.get(sub_def.seq - 1).copied().unwrap_or("");
                    self.validate_element(sub_def, sub_value, Some(&full_xid), findings);
                }
            }
            return;
        }

        if let Some(min_length) = element_def.min_length {
            if value.len() < min_length {
                findings.push(Finding::for_element(
                    format!("Element '{full_xid}': Value is shorter than min length {min_length}."),
                    full_xid.clone(),
                    is_identifier,
                ));
            }
        }
        if let Some(max_length) = element_def.max_length {
            if value.len() > max_length {
                findings.push(Finding::for_element(
                    format!("Element '{full_xid}': Value is longer than max length {max_length}."),
                    full_xid.clone(),
                    is_identifier,
                ));
            }
        }

        if !data_type_ok(value, element_def.data_type) {
            findings.push(Finding::for_element(
                format!(
                    "Element '{full_xid}': Value does not match expected data type '{}'.",
                    element_def.data_type
                ),
                full_xid.clone(),
                is_identifier,
            ));
        }

        if let Some(format) = &element_def.format {
            if !format_ok(value, format) {
                findings.push(Finding::for_element(
                    format!("Element '{full_xid}': Value does not match expected format '{format}'."),
                    full_xid.clone(),
                    is_identifier,
                ));
            }
        }

        if let Some(valid_codes) = &element_def.valid_codes {
            if !valid_codes.is_empty() && !valid_codes.iter().any(|c| c.code == value) {
                let mut allowed: Vec<&str> = valid_codes.iter().map(|c| c.code.as_str()).collect();
                allowed.sort_unstable();
                findings.push(Finding::for_element(
                    format!(
                        "Element '{full_xid}': Invalid code value. Allowed: {}.",
                        allowed.join(", ")
                    ),
                    full_xid,
                    is_identifier,
                ));
            }
        }
    }

    fn validate_syntax_rules(
        &self,
        segment: &Segment,
        effective: &SegmentDefinition,
        findings: &mut Vec<Finding>,
    ) {
        let Some(rules) = &effective.rules else {
            return;
        };
        debug!(
            segment_id = %segment.id,
            rules = rules.len(),
            "evaluating syntax rules"
        );
        for rule in rules {
            if self.conditions_met(segment, &rule.conditions) {
                for assertion in &rule.assertions {
                    self.execute_assertion(segment, assertion, &rule.rule_id, findings);
                }
            }
        }
    }

    fn conditions_met(&self, segment: &Segment, conditions: &Conditions) -> bool {
        if let Some(all_of) = &conditions.all_of {
            return all_of.iter().all(|c| self.evaluate_clause(segment, c));
        }
        if let Some(any_of) = &conditions.any_of {
            return any_of.iter().any(|c| self.evaluate_clause(segment, c));
        }
        true
    }

    fn evaluate_clause(&self, segment: &Segment, clause: &ConditionClause) -> bool {
        let value = segment.element(xid_position(&clause.element));
        let expected = clause.value.as_ref().and_then(|v| v.as_str());
        match clause.operator {
            ConditionOperator::IsPresent => !value.trim().is_empty(),
            ConditionOperator::IsNotPresent => value.trim().is_empty(),
            ConditionOperator::Is => expected.is_some_and(|e| value == e),
            ConditionOperator::IsNot => expected.map_or(true, |e| value != e),
        }
    }

    fn execute_assertion(
        &self,
        segment: &Segment,
        assertion: &AssertionClause,
        rule_id: &str,
        findings: &mut Vec<Finding>,
    ) {
        let (failed, detail) = match assertion.assertion {
            AssertionKind::MustBePresent => {
                let element_id = assertion.element.as_deref().unwrap_or("");
                let value = segment.element(xid_position(element_id));
                (
                    value.trim().is_empty(),
                    format!("Asserting {element_id} MUST BE PRESENT. Data='{value}'"),
                )
            }
            AssertionKind::MustHaveLength => {
                let element_id = assertion.element.as_deref().unwrap_or("");
                let value = segment.element(xid_position(element_id));
                let expected = assertion
                    .value
                    .as_ref()
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as usize;
                (
                    value.chars().count() != expected,
                    format!(
                        "Asserting {element_id} MUST HAVE LENGTH {expected}. Data='{value}' (length={})",
                        value.chars().count()
                    ),
                )
            }
            AssertionKind::AnyOfMustBePresent => {
                let element_ids = assertion.elements.as_deref().unwrap_or(&[]);
                let any_present = element_ids
                    .iter()
                    .any(|id| !segment.element(xid_position(id)).is_empty());
                (
                    !any_present,
                    format!(
                        "Asserting ANY OF {} MUST BE PRESENT.",
                        element_ids.join(", ")
                    ),
                )
            }
            // Accepted from schema files but not enforced.
            AssertionKind::MustBeFormat | AssertionKind::MustNotBePresent => {
                debug!(rule_id, kind = ?assertion.assertion, "skipping unenforced assertion kind");
                return;
            }
        };

        if failed {
            debug!(rule_id, detail = %detail, "assertion failed");
            findings.push(Finding::new(format!("Syntax Rule Failed ({rule_id}): {detail}")));
        }
    }
}

/// Resolve an element reference like `NM108` to its 1-based position by
/// stripping non-digit characters.
fn xid_position(element_id: &str) -> usize {
    let digits: String = element_id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn data_type_ok(value: &str, data_type: DataType) -> bool {
    match data_type {
        DataType::Composite | DataType::An | DataType::Id | DataType::Dt | DataType::Tm => true,
        DataType::N0 | DataType::N1 | DataType::N2 | DataType::R => {
            value.is_empty() || value.trim().parse::<f64>().is_ok()
        }
    }
}

fn format_ok(value: &str, format: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match format {
        "CCYYMMDD" => {
            value.len() == 8
                && value.bytes().all(|b| b.is_ascii_digit())
                && NaiveDate::parse_from_str(value, "%Y%m%d").is_ok()
        }
        "HHMM" => {
            if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            let hour: u32 = value[..2].parse().unwrap_or(99);
            let minute: u32 = value[2..].parse().unwrap_or(99);
            hour <= 23 && minute <= 59
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn schema() -> GuideSchema {
        GuideSchema::from_json(
            r#"{
            "transactionName": "Test 837",
            "version": "005010X222A1",
            "description": "validator tests",
            "contextualDefinitions": {
                "C_NM1_BILLING": {
                    "id": "C_NM1_BILLING",
                    "name": "Billing Provider Name",
                    "elements": {
                        "NM101": {
                            "valid_codes": [{"code": "85", "description": "Billing Provider"}],
                            "is_identifier": true
                        },
                        "NM108": {
                            "valid_codes": [{"code": "XX", "description": "NPI"}]
                        }
                    }
                }
            },
            "segmentDefinitions": {
                "BHT": {
                    "id": "BHT", "name": "Beginning of Hierarchical Transaction",
                    "description": "", "usage": "R", "max_use": 1,
                    "elements": [
                        {"xid": "BHT01", "name": "Hierarchical Structure Code", "usage": "R", "seq": 1, "dataType": "ID",
                         "valid_codes": [{"code": "0019", "description": ""}]},
                        {"xid": "BHT02", "name": "Transaction Set Purpose Code", "usage": "R", "seq": 2, "dataType": "ID"},
                        {"xid": "BHT03", "name": "Reference Identification", "usage": "S", "seq": 3, "dataType": "AN",
                         "minLength": 1, "maxLength": 50},
                        {"xid": "BHT04", "name": "Date", "usage": "R", "seq": 4, "dataType": "DT",
                         "minLength": 8, "maxLength": 8, "format": "CCYYMMDD"},
                        {"xid": "BHT05", "name": "Time", "usage": "S", "seq": 5, "dataType": "TM", "format": "HHMM"},
                        {"xid": "BHT06", "name": "Transaction Type Code", "usage": "N", "seq": 6, "dataType": "ID"}
                    ],
                    "rules": [
                        {
                            "ruleId": "BHT_TIME_PAIR",
                            "description": "A reference identification requires the creation time",
                            "snipLevel": 2,
                            "conditions": {"ALL_OF": [{"element": "BHT03", "operator": "IS_PRESENT"}]},
                            "then": [{"element": "BHT05", "assertion": "MUST_BE_PRESENT"}]
                        }
                    ]
                },
                "NM1": {
                    "id": "NM1", "name": "Individual or Organizational Name",
                    "description": "", "usage": "S", "max_use": 1,
                    "elements": [
                        {"xid": "NM101", "name": "Entity Identifier Code", "usage": "R", "seq": 1, "dataType": "ID",
                         "valid_codes": [
                            {"code": "41", "description": ""}, {"code": "85", "description": ""},
                            {"code": "IL", "description": ""}
                         ]},
                        {"xid": "NM102", "name": "Entity Type Qualifier", "usage": "R", "seq": 2, "dataType": "ID",
                         "valid_codes": [{"code": "1", "description": ""}, {"code": "2", "description": ""}]},
                        {"xid": "NM103", "name": "Name Last or Organization Name", "usage": "S", "seq": 3, "dataType": "AN"},
                        {"xid": "NM108", "name": "Identification Code Qualifier", "usage": "S", "seq": 8, "dataType": "ID",
                         "valid_codes": [
                            {"code": "46", "description": ""}, {"code": "XX", "description": ""},
                            {"code": "MI", "description": ""}
                         ]},
                        {"xid": "NM109", "name": "Identification Code", "usage": "S", "seq": 9, "dataType": "AN"}
                    ]
                },
                "CLM": {
                    "id": "CLM", "name": "Claim Information",
                    "description": "", "usage": "R", "max_use": 100,
                    "elements": [
                        {"xid": "CLM01", "name": "Claim Submitter's Identifier", "usage": "R", "seq": 1, "dataType": "AN"},
                        {"xid": "CLM02", "name": "Monetary Amount", "usage": "R", "seq": 2, "dataType": "R"},
                        {"xid": "CLM05", "name": "Health Care Service Location Information",
                         "usage": "R", "seq": 5, "dataType": "Composite",
                         "sub_elements": [
                            {"xid": "1", "name": "Facility Code Value", "usage": "R", "seq": 1, "dataType": "AN"},
                            {"xid": "2", "name": "Facility Code Qualifier", "usage": "R", "seq": 2, "dataType": "ID",
                             "valid_codes": [{"code": "B", "description": ""}]},
                            {"xid": "3", "name": "Claim Frequency Type Code", "usage": "R", "seq": 3, "dataType": "ID",
                             "valid_codes": [{"code": "1", "description": ""}]}
                         ]}
                    ],
                    "rules": [
                        {
                            "ruleId": "CLM_AMOUNT_SHAPE",
                            "description": "Demo length rule",
                            "snipLevel": 2,
                            "conditions": {"ANY_OF": [{"element": "CLM01", "operator": "IS_PRESENT"}]},
                            "then": [{"element": "CLM02", "assertion": "MUST_HAVE_LENGTH", "value": 3}]
                        }
                    ]
                },
                "REF": {
                    "id": "REF", "name": "Reference Information",
                    "description": "", "usage": "S", "max_use": 1,
                    "elements": [
                        {"xid": "REF01", "name": "Reference Identification Qualifier", "usage": "R", "seq": 1, "dataType": "ID"},
                        {"xid": "REF02", "name": "Reference Identification", "usage": "S", "seq": 2, "dataType": "AN"},
                        {"xid": "REF03", "name": "Description", "usage": "S", "seq": 3, "dataType": "AN"}
                    ],
                    "rules": [
                        {
                            "ruleId": "REF_VALUE",
                            "description": "A reference value is required in some form",
                            "snipLevel": 2,
                            "conditions": {"ALL_OF": [{"element": "REF01", "operator": "IS", "value": "EA"}]},
                            "then": [{"elements": ["REF02", "REF03"], "assertion": "ANY_OF_MUST_BE_PRESENT"}]
                        }
                    ]
                }
            },
            "structure": []
        }"#,
        )
        .expect("test schema parses")
    }

    fn seg(id: &str, values: &[&str]) -> Segment {
        Segment::new(
            id,
            values.iter().map(|v| v.to_string()).collect(),
            1,
            format!("{id}*{}", values.join("*")),
        )
    }

    fn validate(segment: &Segment, context_id: Option<&str>) -> Vec<Finding> {
        let schema = schema();
        let validator = SegmentValidator::new(&schema, ':');
        validator.validate(segment, context_id)
    }

    #[test]
    fn test_compliant_segment_has_no_findings() {
        let bht = seg("BHT", &["0019", "00", "REF123", "20240715", "1200"]);
        assert!(validate(&bht, None).is_empty());
    }

    #[test]
    fn test_unknown_segment_id() {
        let findings = validate(&seg("ZZZ", &["1"]), None);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Base definition for segment 'ZZZ' not found in schema."
        );
        assert!(!findings[0].is_identifier_error);
    }

    #[test]
    fn test_required_element_missing() {
        let findings = validate(&seg("BHT", &["0019"]), None);
        assert!(findings
            .iter()
            .any(|f| f.message == "Required element 'BHT02' is missing."));
        assert!(findings
            .iter()
            .any(|f| f.message == "Required element 'BHT04' is missing."));
    }

    #[test]
    fn test_not_used_element_present() {
        let bht = seg("BHT", &["0019", "00", "REF123", "20240715", "1200", "CH"]);
        let findings = validate(&bht, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Element 'BHT06' is Not Used and should not contain data."
        );
    }

    #[test]
    fn test_situational_element_absent_passes() {
        let bht = seg("BHT", &["0019", "00", "", "20240715"]);
        assert!(validate(&bht, None).is_empty());
    }

    #[test]
    fn test_min_length_violation() {
        let bht = seg("BHT", &["0019", "00", "R", "202407"]);
        let findings = validate(&bht, None);
        assert!(findings
            .iter()
            .any(|f| f.message.contains("BHT04") && f.message.contains("shorter than min length 8")));
    }

    #[test]
    fn test_max_length_violation() {
        let bht = seg("BHT", &["0019", "00", "R", "2024071500"]);
        let findings = validate(&bht, None);
        assert!(findings
            .iter()
            .any(|f| f.message.contains("BHT04") && f.message.contains("longer than max length 8")));
    }

    #[test]
    fn test_date_format_violation() {
        let bht = seg("BHT", &["0019", "00", "R", "INVALID_"]);
        let findings = validate(&bht, None);
        assert!(findings.iter().any(|f| f
            .message
            .contains("does not match expected format 'CCYYMMDD'")));
    }

    #[test]
    fn test_date_format_rejects_impossible_calendar_date() {
        let bht = seg("BHT", &["0019", "00", "R", "20230230"]);
        let findings = validate(&bht, None);
        assert!(findings.iter().any(|f| f
            .message
            .contains("does not match expected format 'CCYYMMDD'")));
    }

    #[test_case("1200", true; "noon")]
    #[test_case("0000", true; "midnight")]
    #[test_case("2359", true; "last minute")]
    #[test_case("2400", false; "hour out of range")]
    #[test_case("1260", false; "minute out of range")]
    #[test_case("999", false; "too short")]
    #[test_case("12:0", false; "non digits")]
    fn test_hhmm_format(value: &str, ok: bool) {
        assert_eq!(format_ok(value, "HHMM"), ok);
    }

    #[test]
    fn test_unknown_format_token_passes() {
        assert!(format_ok("anything", "D8"));
    }

    #[test_case("125", DataType::R, true; "integer as decimal")]
    #[test_case("125.50", DataType::R, true; "decimal")]
    #[test_case("-3", DataType::N0, true; "negative numeric")]
    #[test_case("12A", DataType::N0, false; "trailing letter")]
    #[test_case("", DataType::N2, true; "empty numeric passes")]
    #[test_case("ABC", DataType::An, true; "alphanumeric accepts anything")]
    #[test_case("ABC", DataType::Id, true; "id type shape unchecked")]
    fn test_data_type_check(value: &str, data_type: DataType, ok: bool) {
        assert_eq!(data_type_ok(value, data_type), ok);
    }

    #[test]
    fn test_numeric_data_type_violation_message() {
        let clm = seg("CLM", &["A37YH556", "TOTAL", "", "", "11:B:1"]);
        let findings = validate(&clm, None);
        assert!(findings.iter().any(|f| f.message
            == "Element 'CLM02': Value does not match expected data type 'R'."));
    }

    #[test]
    fn test_invalid_code_lists_allowed_sorted() {
        let bht = seg("BHT", &["0020", "00", "R", "20240715"]);
        let findings = validate(&bht, None);
        assert!(findings
            .iter()
            .any(|f| f.message == "Element 'BHT01': Invalid code value. Allowed: 0019."));
    }

    #[test]
    fn test_composite_sub_element_paths() {
        let clm = seg("CLM", &["A37YH556", "125", "", "", "11:Z:1"]);
        let findings = validate(&clm, None);
        let finding = findings
            .iter()
            .find(|f| f.element_xid.as_deref() == Some("CLM05-2"))
            .expect("sub-element finding");
        assert_eq!(
            finding.message,
            "Element 'CLM05-2': Invalid code value. Allowed: B."
        );
    }

    #[test]
    fn test_composite_missing_sub_element() {
        let clm = seg("CLM", &["A37YH556", "125", "", "", "11"]);
        let findings = validate(&clm, None);
        assert!(findings
            .iter()
            .any(|f| f.message == "Required element 'CLM05-2' is missing."));
        assert!(findings
            .iter()
            .any(|f| f.message == "Required element 'CLM05-3' is missing."));
    }

    #[test]
    fn test_contextual_override_restricts_codes() {
        let nm1 = seg("NM1", &["41", "2", "SUBMITTER"]);
        // base definition allows 41
        assert!(validate(&nm1, None).is_empty());
        // billing-provider context narrows NM101 to 85 and flags it
        let findings = validate(&nm1, Some("C_NM1_BILLING"));
        let finding = findings
            .iter()
            .find(|f| f.element_xid.as_deref() == Some("NM101"))
            .expect("contextual finding");
        assert_eq!(
            finding.message,
            "Element 'NM101': Invalid code value. Allowed: 85."
        );
        assert!(finding.is_identifier_error);
    }

    #[test]
    fn test_contextual_non_identifier_override() {
        let nm1 = seg(
            "NM1",
            &["85", "2", "BILLING PROVIDER", "", "", "", "", "ZZ", "1234567890"],
        );
        let findings = validate(&nm1, Some("C_NM1_BILLING"));
        let finding = findings
            .iter()
            .find(|f| f.element_xid.as_deref() == Some("NM108"))
            .expect("NM108 finding");
        assert_eq!(
            finding.message,
            "Element 'NM108': Invalid code value. Allowed: XX."
        );
        assert!(!finding.is_identifier_error);
    }

    #[test]
    fn test_unknown_context_id_falls_back_to_base() {
        let nm1 = seg("NM1", &["41", "2", "SUBMITTER"]);
        assert!(validate(&nm1, Some("C_DOES_NOT_EXIST")).is_empty());
    }

    #[test]
    fn test_syntax_rule_must_be_present_fires() {
        let bht = seg("BHT", &["0019", "00", "REF123", "20240715"]);
        let findings = validate(&bht, None);
        assert!(findings.iter().any(|f| f.message
            == "Syntax Rule Failed (BHT_TIME_PAIR): Asserting BHT05 MUST BE PRESENT. Data=''"));
    }

    #[test]
    fn test_syntax_rule_conditions_not_met() {
        // no BHT03, so the rule never evaluates its assertion
        let bht = seg("BHT", &["0019", "00", "", "20240715"]);
        assert!(validate(&bht, None).is_empty());
    }

    #[test]
    fn test_syntax_rule_must_have_length() {
        let clm = seg("CLM", &["A37YH556", "12", "", "", "11:B:1"]);
        let findings = validate(&clm, None);
        assert!(findings.iter().any(|f| f.message.contains(
            "Syntax Rule Failed (CLM_AMOUNT_SHAPE): Asserting CLM02 MUST HAVE LENGTH 3"
        )));
    }

    #[test]
    fn test_syntax_rule_any_of_must_be_present() {
        let failing = seg("REF", &["EA"]);
        let findings = validate(&failing, None);
        assert!(findings.iter().any(|f| f.message.contains(
            "Syntax Rule Failed (REF_VALUE): Asserting ANY OF REF02, REF03 MUST BE PRESENT."
        )));

        let passing = seg("REF", &["EA", "", "some description"]);
        assert!(validate(&passing, None).is_empty());

        // IS condition false for a different qualifier
        let other = seg("REF", &["D9"]);
        assert!(validate(&other, None).is_empty());
    }

    #[test]
    fn test_xid_position_strips_non_digits() {
        assert_eq!(xid_position("BHT02"), 2);
        assert_eq!(xid_position("REF01"), 1);
        assert_eq!(xid_position("CLM05"), 5);
        assert_eq!(xid_position("GS08"), 8);
        // digits in the segment id itself are kept too
        assert_eq!(xid_position("NM109"), 109);
        assert_eq!(xid_position("NOPE"), 0);
    }
}
