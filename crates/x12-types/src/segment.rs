use serde::{Deserialize, Serialize};

use crate::Finding;

/// A single data element within a segment.
///
/// `position` is 1-based: `NM1*85*2` holds `85` at position 1 and `2` at
/// position 2. Positions are the authoritative key; element names in the
/// schema are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub position: usize,
    pub value: String,
}

/// A parsed X12 segment.
///
/// Owns its data: the decoder materializes segments once and they are
/// shared by the matcher, validators, and the final document. Equality of
/// `id` does not imply equality of role — the same identifier (`NM1`,
/// `HL`, `REF`) plays different roles in different loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment identifier (e.g., "NM1", "CLM", "ISA").
    pub id: String,
    /// Positional elements, 1-based, in input order.
    pub elements: Vec<Element>,
    /// 1-based ordinal within the segment stream (not a file line).
    pub line: usize,
    /// The original trimmed segment text, without its terminator.
    pub raw: String,
    /// Findings attached after the segment was committed to the document.
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl Segment {
    /// Creates a segment from its identifier and element values.
    pub fn new(
        id: impl Into<String>,
        values: Vec<String>,
        line: usize,
        raw: impl Into<String>,
    ) -> Self {
        let elements = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| Element {
                position: idx + 1,
                value,
            })
            .collect();
        Self {
            id: id.into(),
            elements,
            line,
            raw: raw.into(),
            findings: Vec::new(),
        }
    }

    /// Value of the element at the 1-based `position`, or `""` if absent.
    pub fn element(&self, position: usize) -> &str {
        if position == 0 {
            return "";
        }
        self.elements
            .get(position - 1)
            .map(|e| e.value.as_str())
            .unwrap_or("")
    }

    /// Whether the element at `position` carries a non-blank value.
    pub fn has_element(&self, position: usize) -> bool {
        !self.element(position).trim().is_empty()
    }

    /// Number of elements (excluding the segment identifier).
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Checks if the segment has the given identifier.
    pub fn is(&self, segment_id: &str) -> bool {
        self.id == segment_id
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        for element in &self.elements {
            write!(f, "*{}", element.value)?;
        }
        Ok(())
    }
}
