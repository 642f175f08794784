/// TA1 note codes (TA105) emitted by the envelope validator.
///
/// The subset of the X12 note-code table this validator can produce. The
/// wire form is the three-digit string from [`Ta1NoteCode::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ta1NoteCode {
    /// 000 — no error; used on accepted acknowledgements only.
    NoError,
    /// 001 — control numbers in ISA13 and IEA02 do not match.
    IcnMismatch,
    /// 004 — invalid segment terminator.
    InvalidSegmentTerminator,
    /// 005 — invalid sender ID qualifier (ISA05).
    InvalidSenderIdQualifier,
    /// 006 — invalid sender ID (ISA06).
    InvalidSenderId,
    /// 007 — invalid receiver ID qualifier (ISA07).
    InvalidReceiverIdQualifier,
    /// 008 — invalid receiver ID (ISA08).
    InvalidReceiverId,
    /// 010 — invalid authorization information qualifier (ISA01).
    InvalidAuthQualifier,
    /// 011 — invalid authorization information value (ISA02).
    InvalidAuthValue,
    /// 012 — invalid security information qualifier (ISA03).
    InvalidSecurityQualifier,
    /// 013 — invalid security information value (ISA04).
    InvalidSecurityValue,
    /// 014 — invalid interchange date (ISA09).
    InvalidInterchangeDate,
    /// 015 — invalid interchange time (ISA10).
    InvalidInterchangeTime,
    /// 016 — invalid interchange standards identifier (ISA11).
    InvalidStandardsId,
    /// 017 — invalid interchange version identifier (ISA12).
    InvalidVersionId,
    /// 018 — invalid interchange control number (ISA13).
    InvalidControlNumber,
    /// 019 — invalid acknowledgment requested value (ISA14).
    InvalidAcknowledgmentRequested,
    /// 020 — invalid test indicator (ISA15).
    InvalidTestIndicator,
    /// 021 — number of included groups (IEA01) does not match.
    InvalidGroupCount,
    /// 022 — invalid control structure.
    InvalidControlStructure,
    /// 026 — invalid data element separator.
    InvalidElementSeparator,
    /// 027 — invalid component element separator.
    InvalidComponentSeparator,
}

impl Ta1NoteCode {
    /// The three-digit wire form used in TA105.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoError => "000",
            Self::IcnMismatch => "001",
            Self::InvalidSegmentTerminator => "004",
            Self::InvalidSenderIdQualifier => "005",
            Self::InvalidSenderId => "006",
            Self::InvalidReceiverIdQualifier => "007",
            Self::InvalidReceiverId => "008",
            Self::InvalidAuthQualifier => "010",
            Self::InvalidAuthValue => "011",
            Self::InvalidSecurityQualifier => "012",
            Self::InvalidSecurityValue => "013",
            Self::InvalidInterchangeDate => "014",
            Self::InvalidInterchangeTime => "015",
            Self::InvalidStandardsId => "016",
            Self::InvalidVersionId => "017",
            Self::InvalidControlNumber => "018",
            Self::InvalidAcknowledgmentRequested => "019",
            Self::InvalidTestIndicator => "020",
            Self::InvalidGroupCount => "021",
            Self::InvalidControlStructure => "022",
            Self::InvalidElementSeparator => "026",
            Self::InvalidComponentSeparator => "027",
        }
    }
}

impl std::fmt::Display for Ta1NoteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// TA104 acknowledgment code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCode {
    Accepted,
    Rejected,
}

impl AckCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Accepted => "A",
            Self::Rejected => "R",
        }
    }
}

impl std::fmt::Display for AckCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
