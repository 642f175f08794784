use serde::{Deserialize, Serialize};

use crate::{Finding, Segment};

/// A hierarchical loop within a transaction (e.g. `2000A`, `2300`).
///
/// Holds the segments that belong directly to this loop and the child
/// loop instances, both in input order. Child loops are stored as one
/// ordered vector; keyed access by xid goes through [`Loop::get_loop`]
/// and [`Loop::get_loops`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    /// The schema xid naming this loop.
    pub xid: String,
    /// Segments directly contained in this loop (no nested-loop segments).
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Child loop instances in order of appearance in the input.
    #[serde(default)]
    pub loops: Vec<Loop>,
    /// Structural issues discovered while populating this loop.
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl Loop {
    pub fn new(xid: impl Into<String>) -> Self {
        Self {
            xid: xid.into(),
            segments: Vec::new(),
            loops: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// Appends a child loop instance, preserving input order.
    pub fn add_loop(&mut self, child: Loop) {
        self.loops.push(child);
    }

    /// First direct segment with the given identifier.
    pub fn get_segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == segment_id)
    }

    /// All direct segments with the given identifier, in input order.
    pub fn get_segments(&self, segment_id: &str) -> Vec<&Segment> {
        self.segments.iter().filter(|s| s.id == segment_id).collect()
    }

    /// First child loop instance with the given xid.
    pub fn get_loop(&self, xid: &str) -> Option<&Loop> {
        self.loops.iter().find(|l| l.xid == xid)
    }

    /// All child loop instances with the given xid, in input order.
    pub fn get_loops(&self, xid: &str) -> Vec<&Loop> {
        self.loops.iter().filter(|l| l.xid == xid).collect()
    }
}

/// One ST/SE transaction set: header, trailer, and the matched body tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub header: Segment,
    pub trailer: Segment,
    pub body: Loop,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// One GS/GE functional group and its transaction sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalGroup {
    pub header: Segment,
    pub trailer: Segment,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// One ISA/IEA interchange, the root of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interchange {
    pub header: Segment,
    pub trailer: Segment,
    #[serde(default)]
    pub functional_groups: Vec<FunctionalGroup>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl FunctionalGroup {
    pub fn new(header: Segment, trailer: Segment) -> Self {
        Self {
            header,
            trailer,
            transactions: Vec::new(),
            findings: Vec::new(),
        }
    }
}

impl Interchange {
    pub fn new(header: Segment, trailer: Segment) -> Self {
        Self {
            header,
            trailer,
            functional_groups: Vec::new(),
            findings: Vec::new(),
        }
    }
}
