//! Top-level parse driver — envelope discovery and per-transaction
//! structural matching.
//!
//! The driver carves ISA/IEA, GS/GE, and ST/SE boundaries out of the flat
//! segment stream, then hands each transaction body to the structural
//! matcher with the children of the schema's `ST_LOOP`. All problems are
//! findings on the returned document; nothing here returns an error.

use ig_schema::{GuideSchema, StructureLoop, StructureNode};
use tracing::{debug, info, warn};
use x12_types::{Finding, FunctionalGroup, Interchange, Loop, Segment, Transaction};

use crate::error::StructureError;
use crate::matcher::StructuralMatcher;
use crate::tokenize::{decode, find_segment};
use crate::validator::SegmentValidator;

/// Parse a raw X12 interchange against a guide schema.
///
/// Total: every input yields an [`Interchange`]. The only short-circuit is
/// the complete absence of an ISA/IEA envelope, which returns a document
/// with dummy envelope segments and a single finding.
pub fn parse(raw: &str, schema: &GuideSchema) -> Interchange {
    let decoded = decode(raw);
    let validator = SegmentValidator::new(schema, decoded.delimiters.component_char());
    let segments = decoded.segments;

    let isa_idx = find_segment(&segments, "ISA", 0);
    let iea_idx = find_segment(&segments, "IEA", isa_idx.unwrap_or(0));
    let (Some(isa_idx), Some(iea_idx)) = (isa_idx, iea_idx) else {
        warn!("no ISA/IEA envelope in input");
        let mut interchange = Interchange::new(
            Segment::new("ISA", vec![], 0, ""),
            Segment::new("IEA", vec![], 0, ""),
        );
        interchange.findings = decoded.findings;
        interchange
            .findings
            .push(Finding::new("ISA/IEA envelope not found."));
        return interchange;
    };

    let mut isa = segments[isa_idx].clone();
    let isa_findings = validator.validate(&isa, None);
    isa.findings.extend(isa_findings);
    let mut iea = segments[iea_idx].clone();
    let iea_findings = validator.validate(&iea, None);
    iea.findings.extend(iea_findings);

    let mut interchange = Interchange::new(isa, iea);
    interchange.findings = decoded.findings;

    let group_segments = &segments[isa_idx + 1..iea_idx];
    let mut cursor = 0;
    while cursor < group_segments.len() {
        let Some(gs_idx) = find_segment(group_segments, "GS", cursor) else {
            break;
        };
        let Some(ge_idx) = find_segment(group_segments, "GE", gs_idx) else {
            interchange.findings.push(Finding::new(format!(
                "Unclosed functional group at line {}.",
                group_segments[gs_idx].line
            )));
            break;
        };

        let mut gs = group_segments[gs_idx].clone();
        let gs_findings = validator.validate(&gs, None);
        gs.findings.extend(gs_findings);
        let mut ge = group_segments[ge_idx].clone();
        let ge_findings = validator.validate(&ge, None);
        ge.findings.extend(ge_findings);
        let mut group = FunctionalGroup::new(gs, ge);

        let transaction_segments = &group_segments[gs_idx + 1..ge_idx];
        let mut ts_cursor = 0;
        while ts_cursor < transaction_segments.len() {
            let Some(st_idx) = find_segment(transaction_segments, "ST", ts_cursor) else {
                break;
            };
            let Some(se_idx) = find_segment(transaction_segments, "SE", st_idx) else {
                interchange.findings.push(Finding::new(format!(
                    "Unclosed transaction set at line {}.",
                    transaction_segments[st_idx].line
                )));
                break;
            };
            let block = &transaction_segments[st_idx..=se_idx];
            group
                .transactions
                .push(parse_transaction_set(block, schema, &validator));
            ts_cursor = se_idx + 1;
        }
        interchange.functional_groups.push(group);
        cursor = ge_idx + 1;
    }

    let total_findings = crate::report::collect_findings(&interchange).len();
    if total_findings > 0 {
        info!(findings = total_findings, "parse completed with findings");
    } else {
        info!("parse completed clean");
    }
    interchange
}

/// Parse one ST..SE block into a [`Transaction`].
fn parse_transaction_set(
    block: &[Segment],
    schema: &GuideSchema,
    validator: &SegmentValidator<'_>,
) -> Transaction {
    let st = block[0].clone();
    let se = block[block.len() - 1].clone();
    let body_segments = &block[1..block.len() - 1];

    info!(
        control_number = st.element(2),
        body_segments = body_segments.len(),
        "parsing transaction set"
    );

    let st_loop = match locate_st_loop(schema) {
        Ok(st_loop) => st_loop,
        Err(e) => {
            // schema defect: return an empty body and report it on the
            // transaction instead of failing the parse
            let mut transaction = Transaction {
                header: st.clone(),
                trailer: se,
                body: Loop::new("ST_LOOP"),
                findings: Vec::new(),
            };
            transaction.findings.push(Finding {
                message: format!("Critical parsing error: {e}"),
                line: Some(st.line),
                segment_id: Some(st.id.clone()),
                element_xid: None,
                is_identifier_error: false,
            });
            return transaction;
        }
    };

    // ST and SE are consumed by the envelope split, not the matcher
    let children: Vec<&StructureNode> = st_loop
        .children
        .iter()
        .filter(|c| c.xid() != "ST" && c.xid() != "SE")
        .collect();
    debug!(
        children = children.len(),
        "matching transaction body against ST_LOOP children"
    );

    let matcher = StructuralMatcher::new(validator);
    let (body, consumed) = matcher.build_tree(body_segments, &children, "ST_LOOP", 1);

    let mut transaction = Transaction {
        header: st,
        trailer: se,
        findings: body.findings.clone(),
        body,
    };

    if consumed < body_segments.len() {
        let unparsed = &body_segments[consumed..];
        let problematic = &unparsed[0];
        let message = format!(
            "Transaction parsing incomplete. Could not process {} remaining segments starting \
             with '{}' (line {}). This may indicate an unsupported structure or validation issue.",
            unparsed.len(),
            problematic.id,
            problematic.line
        );
        warn!(%message, "unparsed transaction tail");
        transaction.findings.push(Finding {
            message,
            line: Some(problematic.line),
            segment_id: Some(problematic.id.clone()),
            element_xid: None,
            is_identifier_error: false,
        });
    }

    transaction
}

/// Find the `ST_LOOP` in the schema structure: either top-level, or
/// nested as `ISA_LOOP` → `GS_LOOP` → `ST_LOOP`.
fn locate_st_loop(schema: &GuideSchema) -> Result<&StructureLoop, StructureError> {
    if let Some(st_loop) = schema.structure.iter().find(|l| l.xid == "ST_LOOP") {
        return Ok(st_loop);
    }
    let isa_loop = schema
        .structure
        .iter()
        .find(|l| l.xid == "ISA_LOOP")
        .ok_or(StructureError::IsaLoopNotFound)?;
    let gs_loop = isa_loop
        .children
        .iter()
        .find_map(|c| match c {
            StructureNode::Loop(l) if l.xid == "GS_LOOP" => Some(l),
            _ => None,
        })
        .ok_or(StructureError::GsLoopNotFound)?;
    gs_loop
        .children
        .iter()
        .find_map(|c| match c {
            StructureNode::Loop(l) if l.xid == "ST_LOOP" => Some(l),
            _ => None,
        })
        .ok_or(StructureError::StLoopNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_only_schema() -> GuideSchema {
        GuideSchema::from_json(
            r#"{
            "transactionName": "Envelope tests",
            "version": "005010X222A1",
            "description": "",
            "segmentDefinitions": {},
            "contextualDefinitions": {},
            "structure": [
                {
                    "type": "loop", "xid": "ISA_LOOP", "name": "Interchange", "usage": "R", "repeat": ">1",
                    "children": [
                        {
                            "type": "loop", "xid": "GS_LOOP", "name": "Group", "usage": "R", "repeat": ">1",
                            "children": [
                                {
                                    "type": "loop", "xid": "ST_LOOP", "name": "Transaction", "usage": "R", "repeat": ">1",
                                    "children": [
                                        {"type": "segment", "xid": "ST", "name": "Transaction Set Header", "usage": "R", "max_use": 1},
                                        {"type": "segment", "xid": "SE", "name": "Transaction Set Trailer", "usage": "R", "max_use": 1}
                                    ]
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#,
        )
        .unwrap()
    }

    fn schema_without_st_loop() -> GuideSchema {
        GuideSchema::from_json(
            r#"{
            "transactionName": "Broken",
            "version": "005010X222A1",
            "description": "",
            "segmentDefinitions": {},
            "contextualDefinitions": {},
            "structure": []
        }"#,
        )
        .unwrap()
    }

    const ENVELOPE: &str = concat!(
        "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       ",
        "*240718*1200*^*00501*000000001*0*P*:~",
        "GS*HC*SENDER*RECEIVER*20240718*1200*1*X*005010X222A1~",
        "ST*837*0001~",
        "SE*1*0001~",
        "GE*1*1~",
        "IEA*1*000000001~",
    );

    #[test]
    fn test_parse_missing_envelope_is_total() {
        let interchange = parse("BHT*0019*00~", &envelope_only_schema());
        assert!(interchange
            .findings
            .iter()
            .any(|f| f.message == "ISA/IEA envelope not found."));
        assert!(interchange.functional_groups.is_empty());
        assert_eq!(interchange.header.id, "ISA");
        assert_eq!(interchange.header.line, 0);
    }

    #[test]
    fn test_parse_empty_input_is_total() {
        let interchange = parse("", &envelope_only_schema());
        assert!(interchange
            .findings
            .iter()
            .any(|f| f.message == "ISA/IEA envelope not found."));
    }

    #[test]
    fn test_parse_envelope_shape() {
        let interchange = parse(ENVELOPE, &envelope_only_schema());
        assert_eq!(interchange.header.id, "ISA");
        assert_eq!(interchange.trailer.id, "IEA");
        assert_eq!(interchange.functional_groups.len(), 1);
        let group = &interchange.functional_groups[0];
        assert_eq!(group.header.id, "GS");
        assert_eq!(group.trailer.id, "GE");
        assert_eq!(group.transactions.len(), 1);
        let transaction = &group.transactions[0];
        assert_eq!(transaction.header.element(2), "0001");
        assert_eq!(transaction.body.xid, "ST_LOOP");
    }

    #[test]
    fn test_parse_unclosed_group() {
        let input = ENVELOPE.replace("GE*1*1~", "");
        let interchange = parse(&input, &envelope_only_schema());
        assert!(interchange
            .findings
            .iter()
            .any(|f| f.message.starts_with("Unclosed functional group at line")));
        assert!(interchange.functional_groups.is_empty());
    }

    #[test]
    fn test_parse_unclosed_transaction() {
        let input = ENVELOPE.replace("SE*1*0001~", "");
        let interchange = parse(&input, &envelope_only_schema());
        assert!(interchange
            .findings
            .iter()
            .any(|f| f.message.starts_with("Unclosed transaction set at line")));
        // the group itself still closes
        assert_eq!(interchange.functional_groups.len(), 1);
        assert!(interchange.functional_groups[0].transactions.is_empty());
    }

    #[test]
    fn test_parse_schema_without_st_loop_downgrades_to_finding() {
        let interchange = parse(ENVELOPE, &schema_without_st_loop());
        let transaction = &interchange.functional_groups[0].transactions[0];
        assert!(transaction.findings.iter().any(|f| f.message
            == "Critical parsing error: ISA_LOOP not found in schema structure"));
        assert!(transaction.body.segments.is_empty());
    }

    #[test]
    fn test_parse_multiple_transactions_in_group() {
        let input = ENVELOPE.replace(
            "SE*1*0001~GE*1*1~",
            "SE*1*0001~ST*837*0002~SE*1*0002~GE*2*1~",
        );
        let interchange = parse(&input, &envelope_only_schema());
        let group = &interchange.functional_groups[0];
        assert_eq!(group.transactions.len(), 2);
        assert_eq!(group.transactions[1].header.element(2), "0002");
    }

    #[test]
    fn test_locate_st_loop_top_level() {
        let schema = GuideSchema::from_json(
            r#"{
            "transactionName": "Flat", "version": "1", "description": "",
            "segmentDefinitions": {}, "contextualDefinitions": {},
            "structure": [
                {"type": "loop", "xid": "ST_LOOP", "name": "Transaction", "usage": "R", "repeat": ">1", "children": []}
            ]
        }"#,
        )
        .unwrap();
        assert!(locate_st_loop(&schema).is_ok());
    }

    #[test]
    fn test_locate_st_loop_errors() {
        assert!(matches!(
            locate_st_loop(&schema_without_st_loop()),
            Err(StructureError::IsaLoopNotFound)
        ));
    }
}
