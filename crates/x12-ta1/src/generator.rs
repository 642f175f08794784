//! TA1 acknowledgement synthesis.
//!
//! Produces a self-contained interchange (ISA + TA1 + IEA, no GS/GE
//! envelope) answering a received interchange. Output delimiters are
//! fixed: `*` element separator, `>` component separator, `~` segment
//! terminator; the generator does not negotiate delimiters.

use chrono::Local;
use tracing::debug;
use x12_types::Segment;

use crate::codes::{AckCode, Ta1NoteCode};

/// Generates TA1 acknowledgements for received interchanges.
pub struct Ta1Generator;

impl Ta1Generator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a complete TA1 interchange, or `None` when no
    /// acknowledgement is due.
    ///
    /// Nothing is produced when the error list is empty, the original
    /// ISA14 did not request an acknowledgement, and `force` is false.
    /// A malformed ISA header (fewer than 16 elements) also yields
    /// `None`.
    pub fn generate(
        &self,
        isa_header: &Segment,
        errors: &[Ta1NoteCode],
        force: bool,
    ) -> Option<String> {
        if isa_header.element_count() < 16 {
            debug!("ISA header malformed or missing, no TA1 generated");
            return None;
        }

        let ack_requested = isa_header.element(14).trim() == "1";
        let has_errors = !errors.is_empty();
        if !has_errors && !ack_requested && !force {
            debug!("no errors and no acknowledgement requested, no TA1 generated");
            return None;
        }

        let (ack_code, note_code) = if has_errors {
            (AckCode::Rejected, errors[0])
        } else {
            (AckCode::Accepted, Ta1NoteCode::NoError)
        };

        let original_icn = format!("{:0>9}", isa_header.element(13).trim());
        let original_date = isa_header.element(9);
        let ta1_date = if original_date.len() == 8 {
            &original_date[2..]
        } else {
            original_date
        };
        let ta1_time = isa_header.element(10);

        let now = Local::now();
        let response_date = now.format("%y%m%d").to_string();
        let response_time = now.format("%H%M").to_string();
        let response_icn = format!("{:0>9}", now.format("%y%m%d%H%M").to_string());

        let auth_qualifier = or_default(isa_header.element(1), "00");
        let auth_info = or_default(isa_header.element(2), "          ");
        let security_qualifier = or_default(isa_header.element(3), "00");
        let security_info = or_default(isa_header.element(4), "          ");
        let sender_qualifier = or_default(isa_header.element(5), "ZZ");
        let sender_id = or_default(isa_header.element(6), "               ");
        let receiver_qualifier = or_default(isa_header.element(7), "ZZ");
        let receiver_id = or_default(isa_header.element(8), "               ");
        let standards_id = or_default(isa_header.element(11), "^");
        let version = or_default(isa_header.element(12), "00501");
        let test_indicator = or_default(isa_header.element(15), "P");

        // Response envelope: original receiver becomes the sender and
        // vice versa; ISA14 is 0 (the acknowledgement itself is not
        // acknowledged).
        let isa_response = format!(
            "ISA*{auth_qualifier}*{auth_info}*{security_qualifier}*{security_info}\
             *{receiver_qualifier}*{receiver_id}*{sender_qualifier}*{sender_id}\
             *{response_date}*{response_time}*{standards_id}*{version}*{response_icn}\
             *0*{test_indicator}*>~"
        );
        let ta1_segment = format!(
            "TA1*{original_icn}*{ta1_date}*{ta1_time}*{ack_code}*{note_code}~"
        );
        let iea_response = format!("IEA*1*{response_icn}~");

        let interchange = format!("{isa_response}{ta1_segment}{iea_response}");
        debug!(ack = %ack_code, note = %note_code, "generated TA1 interchange");
        Some(interchange)
    }
}

impl Default for Ta1Generator {
    fn default() -> Self {
        Self::new()
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}
