use serde::{Deserialize, Serialize};

/// A non-fatal issue discovered while parsing or validating a document.
///
/// Findings never abort a parse; they attach to the segment, loop, or
/// envelope entity where the problem was observed.
///
/// The `is_identifier_error` flag is load-bearing for the structural
/// matcher: a finding raised against an element the schema marks as an
/// identifier means "this segment belongs to a different context", not
/// "this segment carries bad data".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    /// Element xid path, e.g. `NM108` or `CLM05-2` for a composite sub-element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_xid: Option<String>,
    #[serde(default)]
    pub is_identifier_error: bool,
}

impl Finding {
    /// A finding with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            segment_id: None,
            element_xid: None,
            is_identifier_error: false,
        }
    }

    /// A finding raised against a specific element path.
    pub fn for_element(
        message: impl Into<String>,
        element_xid: impl Into<String>,
        is_identifier_error: bool,
    ) -> Self {
        Self {
            message: message.into(),
            line: None,
            segment_id: None,
            element_xid: Some(element_xid.into()),
            is_identifier_error,
        }
    }

    /// A finding anchored to a segment occurrence in the input stream.
    pub fn for_segment(
        message: impl Into<String>,
        segment_id: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            segment_id: Some(segment_id.into()),
            element_xid: None,
            is_identifier_error: false,
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(xid) = &self.element_xid {
            write!(f, " [{xid}]")?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}
