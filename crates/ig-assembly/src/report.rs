//! Finding aggregation — walk a parsed document and collect every finding
//! in source order, with a breadcrumb describing where it was observed.

use std::collections::HashMap;

use serde::Serialize;
use x12_types::{Finding, Interchange, Loop};

/// A finding paired with the location breadcrumb it was collected from,
/// e.g. `Loop ST_LOOP/2000A[0]/2300[1]` or `Segment CLM*... (Line: 12)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedFinding {
    pub location: String,
    pub finding: Finding,
}

/// Collect all findings in the document.
///
/// Order: interchange findings, then per functional group its findings,
/// then per transaction its findings followed by the loop tree — each
/// loop's own findings, its segments' findings, then child loops
/// recursively in input order.
pub fn collect_findings(interchange: &Interchange) -> Vec<LocatedFinding> {
    let mut out = Vec::new();

    for finding in &interchange.findings {
        out.push(LocatedFinding {
            location: "Interchange".to_string(),
            finding: finding.clone(),
        });
    }

    for group in &interchange.functional_groups {
        for finding in &group.findings {
            out.push(LocatedFinding {
                location: "Functional Group".to_string(),
                finding: finding.clone(),
            });
        }
        for transaction in &group.transactions {
            for finding in &transaction.findings {
                out.push(LocatedFinding {
                    location: "Transaction".to_string(),
                    finding: finding.clone(),
                });
            }
            collect_loop_findings(&transaction.body, &transaction.body.xid, &mut out);
        }
    }

    out
}

fn collect_loop_findings(loop_node: &Loop, path: &str, out: &mut Vec<LocatedFinding>) {
    for finding in &loop_node.findings {
        out.push(LocatedFinding {
            location: format!("Loop {path}"),
            finding: finding.clone(),
        });
    }
    for segment in &loop_node.segments {
        for finding in &segment.findings {
            out.push(LocatedFinding {
                location: format!("Segment {} (Line: {})", segment.raw, segment.line),
                finding: finding.clone(),
            });
        }
    }
    let mut instance_counts: HashMap<&str, usize> = HashMap::new();
    for child in &loop_node.loops {
        let index = instance_counts.entry(child.xid.as_str()).or_insert(0);
        let child_path = format!("{path}/{}[{}]", child.xid, index);
        *index += 1;
        collect_loop_findings(child, &child_path, out);
    }
}
