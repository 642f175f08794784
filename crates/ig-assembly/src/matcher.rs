//! Structural matching — aligning the flat segment stream to the guide
//! schema's recursive loop tree.
//!
//! Many X12 segments (`NM1`, `HL`, `REF`, `DTP`) appear with identical
//! identifiers in multiple sibling loops. The matcher resolves the
//! ambiguity with trial validation: a candidate node only wins if
//! validating the segment under the node's contextual definition raises
//! no identifier-flagged findings. Candidates are tried in schema order
//! behind two cheaper gates (usage limit, starting-id match), so trial
//! validation stays linear in the local sibling fanout.

use ig_schema::{StructureNode, Usage};
use tracing::debug;
use x12_types::{Finding, Loop, Segment};

use crate::validator::SegmentValidator;

/// Walks a window of flat segments against the children of a schema loop.
pub struct StructuralMatcher<'a> {
    validator: &'a SegmentValidator<'a>,
}

impl<'a> StructuralMatcher<'a> {
    pub fn new(validator: &'a SegmentValidator<'a>) -> Self {
        Self { validator }
    }

    /// Build one loop instance from the front of `segments`.
    ///
    /// Returns the populated loop and the number of segments consumed.
    /// A segment no sibling can claim terminates the loop without being
    /// consumed — it belongs to an ancestor. Required children that never
    /// occurred are recorded as structural findings on the returned loop.
    pub fn build_tree(
        &self,
        segments: &[Segment],
        nodes: &[&StructureNode],
        parent_xid: &str,
        depth: usize,
    ) -> (Loop, usize) {
        let mut out = Loop::new(parent_xid);
        let mut cursor = 0usize;
        let mut usage_counts = vec![0u32; nodes.len()];

        debug!(
            depth,
            loop_xid = parent_xid,
            segments = segments.len(),
            nodes = nodes.len(),
            "matching loop"
        );

        while cursor < segments.len() {
            let current = &segments[cursor];
            let Some(node_index) = self.find_best_match(current, nodes, &usage_counts) else {
                debug!(
                    depth,
                    loop_xid = parent_xid,
                    segment_id = %current.id,
                    line = current.line,
                    "no matching child, returning to parent"
                );
                break;
            };

            match nodes[node_index] {
                StructureNode::Segment(segment_node) => {
                    let mut committed = current.clone();
                    let findings = self
                        .validator
                        .validate(current, segment_node.context_definition_id.as_deref());
                    committed.findings.extend(findings);
                    out.segments.push(committed);
                    cursor += 1;
                }
                StructureNode::Loop(loop_node) => {
                    let child_nodes: Vec<&StructureNode> = loop_node.children.iter().collect();
                    let (child, consumed) = self.build_tree(
                        &segments[cursor..],
                        &child_nodes,
                        &loop_node.xid,
                        depth + 1,
                    );
                    if consumed == 0 {
                        // a loop instance that consumed nothing can never
                        // make progress
                        break;
                    }
                    out.findings.extend(child.findings.iter().cloned());
                    out.add_loop(child);
                    cursor += consumed;
                }
            }
            usage_counts[node_index] += 1;
        }

        for (i, node) in nodes.iter().enumerate() {
            if node.usage() == Usage::R && usage_counts[i] == 0 {
                let message = format!(
                    "Required segment or loop '{}' ({}) is missing from loop '{}'.",
                    node.xid(),
                    node.name(),
                    parent_xid
                );
                debug!(depth, loop_xid = parent_xid, %message, "structural finding");
                out.findings.push(Finding::new(message));
            }
        }

        (out, cursor)
    }

    /// Select the first sibling node that can claim `current`.
    ///
    /// Gates, in order: usage below the node's limit, starting-segment-id
    /// equality, and a trial validation under the node's contextual
    /// definition with zero identifier-flagged findings. The gate order
    /// is load-bearing: trial validation only runs for candidates that
    /// could otherwise consume the segment.
    fn find_best_match(
        &self,
        current: &Segment,
        nodes: &[&StructureNode],
        usage_counts: &[u32],
    ) -> Option<usize> {
        for (i, node) in nodes.iter().enumerate() {
            if usage_counts[i] >= node.limit() {
                continue;
            }
            if node.starting_segment_id() != Some(current.id.as_str()) {
                continue;
            }

            let context_id = node.starting_context_id();
            let trial = self.validator.validate(current, context_id);
            if trial.iter().any(|f| f.is_identifier_error) {
                debug!(
                    segment_id = %current.id,
                    node_xid = node.xid(),
                    context = context_id.unwrap_or("none"),
                    "trial validation rejected candidate"
                );
                continue;
            }
            return Some(i);
        }
        None
    }
}
