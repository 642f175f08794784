/// X12 delimiter characters.
///
/// The three characters that control X12 interchange structure. Unlike
/// EDIFACT there is no service string advice segment: the delimiters are
/// read from fixed offsets inside the opening ISA segment, whose element
/// widths are mandated by the standard.
///
/// When no usable ISA header is present, the conventional defaults apply:
/// - Element separator: `*` (asterisk)
/// - Component (sub-element) separator: `:` (colon)
/// - Segment terminator: `~` (tilde)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct X12Delimiters {
    /// Data element separator (default: `*`).
    pub element: u8,
    /// Component data element separator (default: `:`).
    pub component: u8,
    /// Segment terminator (default: `~`).
    pub segment: u8,
}

impl Default for X12Delimiters {
    fn default() -> Self {
        Self {
            element: b'*',
            component: b':',
            segment: b'~',
        }
    }
}

/// Fixed ISA offsets mandated by the standard: the byte after "ISA" is the
/// element separator; ISA16 and the terminator close the 106-byte header.
const ELEMENT_OFFSET: usize = 3;
const COMPONENT_OFFSET: usize = 104;
const SEGMENT_OFFSET: usize = 105;
const MIN_ISA_LEN: usize = 106;

impl X12Delimiters {
    /// Standard X12 delimiters (when no ISA header can be read).
    pub const STANDARD: Self = Self {
        element: b'*',
        component: b':',
        segment: b'~',
    };

    /// Detect delimiters from a raw X12 interchange.
    ///
    /// If the trimmed input starts with `ISA` and is long enough to hold a
    /// complete ISA segment, the three delimiters are read from their fixed
    /// offsets. Otherwise the standard defaults are returned.
    ///
    /// Returns `(from_isa, delimiters)`.
    pub fn detect(input: &str) -> (bool, Self) {
        let trimmed = input.trim();
        let bytes = trimmed.as_bytes();
        if trimmed.starts_with("ISA") && bytes.len() >= MIN_ISA_LEN {
            (
                true,
                Self {
                    element: bytes[ELEMENT_OFFSET],
                    component: bytes[COMPONENT_OFFSET],
                    segment: bytes[SEGMENT_OFFSET],
                },
            )
        } else {
            (false, Self::default())
        }
    }

    /// Element separator as a `char`.
    pub fn element_char(&self) -> char {
        self.element as char
    }

    /// Component separator as a `char`.
    pub fn component_char(&self) -> char {
        self.component as char
    }

    /// Segment terminator as a `char`.
    pub fn segment_char(&self) -> char {
        self.segment as char
    }
}
