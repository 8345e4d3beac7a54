//! ESC/POS command subset and print-job framing.
//!
//! Pure byte builders, no I/O.  The channel ([`super::DevicePrinter`])
//! writes whatever [`frame`] produces; tests assert on these bytes
//! directly.
//!
//! Only the three sequences the appliance needs are implemented: reset,
//! center alignment, and full cut with feed.

/// Initialise / reset the printer: `ESC @`.
pub const RESET: &[u8] = &[0x1B, 0x40];

/// Center-align subsequent text: `ESC a 1`.
pub const CENTER_ALIGN: &[u8] = &[0x1B, 0x61, 0x01];

/// Feed and full cut: `GS V A 3`.
pub const CUT: &[u8] = &[0x1D, 0x56, 0x41, 0x03];

/// Line feeds emitted after the payload so the text clears the cutter area.
pub const TRAILING_FEEDS: usize = 4;

/// Glyph substituted for characters outside the printer's character set.
pub const SUBSTITUTE: u8 = b'?';

/// Encode `text` for the printer's ASCII character set.
///
/// Out-of-set characters become [`SUBSTITUTE`] rather than failing the
/// print job — a poem with one odd glyph still prints.
pub fn encode_payload(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_ascii() {
                c as u8
            } else {
                SUBSTITUTE
            }
        })
        .collect()
}

/// Build a complete print job for `text`.
///
/// Framing order is fixed: reset, center-align, payload, trailing line
/// feeds, cut.
pub fn frame(text: &str) -> Vec<u8> {
    let payload = encode_payload(text);

    let mut job = Vec::with_capacity(
        RESET.len() + CENTER_ALIGN.len() + payload.len() + TRAILING_FEEDS + CUT.len(),
    );
    job.extend_from_slice(RESET);
    job.extend_from_slice(CENTER_ALIGN);
    job.extend_from_slice(&payload);
    job.extend_from_slice(&[b'\n'; TRAILING_FEEDS]);
    job.extend_from_slice(CUT);
    job
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_starts_with_reset_then_center_align() {
        let job = frame("hello");
        assert_eq!(&job[..2], RESET);
        assert_eq!(&job[2..5], CENTER_ALIGN);
    }

    #[test]
    fn frame_ends_with_feeds_then_cut() {
        let job = frame("hello");
        let tail = &job[job.len() - CUT.len()..];
        assert_eq!(tail, CUT);

        let feeds = &job[job.len() - CUT.len() - TRAILING_FEEDS..job.len() - CUT.len()];
        assert!(feeds.iter().all(|&b| b == b'\n'));
    }

    #[test]
    fn frame_holds_for_empty_text() {
        let job = frame("");
        assert_eq!(&job[..2], RESET);
        assert_eq!(&job[2..5], CENTER_ALIGN);
        assert_eq!(&job[job.len() - CUT.len()..], CUT);
        assert_eq!(
            job.len(),
            RESET.len() + CENTER_ALIGN.len() + TRAILING_FEEDS + CUT.len()
        );
    }

    #[test]
    fn payload_sits_between_prefix_and_feeds() {
        let job = frame("line1\nline2");
        let start = RESET.len() + CENTER_ALIGN.len();
        let end = job.len() - CUT.len() - TRAILING_FEEDS;
        assert_eq!(&job[start..end], b"line1\nline2");
    }

    #[test]
    fn non_ascii_is_substituted_not_dropped() {
        let encoded = encode_payload("café ☺");
        assert_eq!(encoded, b"caf? ?");
    }

    #[test]
    fn ascii_passes_through_unchanged() {
        let text = "A poem,\nwith lines.\n";
        assert_eq!(encode_payload(text), text.as_bytes());
    }
}
