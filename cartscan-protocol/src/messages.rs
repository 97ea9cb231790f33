//! Message bytes for the scanner link
//!
//! Message types are divided into two directions:
//! - Controller → Peripheral: scan requests
//! - Peripheral → Controller: verdicts and the start-scanning command

// Message bytes: Controller → Peripheral
pub const CMD_SCAN_RETRY: u8 = 0x14;
pub const CMD_SCAN_FINAL: u8 = 0x13;

// Message bytes: Peripheral → Controller
pub const RES_ACCEPT: u8 = b'A';
pub const RES_REJECT: u8 = b'R';
pub const RES_DUPLICATE: u8 = b'D';
pub const RES_SKIP: u8 = b'S';
pub const CMD_START_SCANNING: u8 = b'B';

/// Scan request sent to the peripheral
///
/// The peripheral may use the distinction to decide whether to prompt for
/// a re-scan locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanRequest {
    /// More attempts remain after this one
    Retry,
    /// Last attempt for this cartridge
    Final,
}

impl ScanRequest {
    /// Pick the request for an attempt given how many attempts remain,
    /// counting the one about to be made
    pub fn for_remaining(remaining: u8) -> Self {
        if remaining > 1 {
            ScanRequest::Retry
        } else {
            ScanRequest::Final
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            ScanRequest::Retry => CMD_SCAN_RETRY,
            ScanRequest::Final => CMD_SCAN_FINAL,
        }
    }

    /// Returns true if this is the last attempt
    pub fn is_final(&self) -> bool {
        matches!(self, ScanRequest::Final)
    }
}

/// Verdict reported by the peripheral for the cartridge at the scan position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Code read and accepted
    Accept,
    /// Code read and rejected
    Reject,
    /// Code already seen in this batch
    Duplicate,
    /// Code not readable; the controller should retry
    Skip,
}

impl Verdict {
    /// Parse a verdict from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            RES_ACCEPT => Some(Verdict::Accept),
            RES_REJECT => Some(Verdict::Reject),
            RES_DUPLICATE => Some(Verdict::Duplicate),
            RES_SKIP => Some(Verdict::Skip),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Verdict::Accept => RES_ACCEPT,
            Verdict::Reject => RES_REJECT,
            Verdict::Duplicate => RES_DUPLICATE,
            Verdict::Skip => RES_SKIP,
        }
    }
}

/// Any byte the controller understands from the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Inbound {
    /// Batch setup finished on the peripheral, enter scanning mode
    StartScanning,
    /// Verdict for the pending scan request
    Verdict(Verdict),
}

impl Inbound {
    /// Parse an inbound byte; unknown bytes yield `None`
    pub fn from_byte(byte: u8) -> Option<Self> {
        if byte == CMD_START_SCANNING {
            return Some(Inbound::StartScanning);
        }
        Verdict::from_byte(byte).map(Inbound::Verdict)
    }

    /// Convert to wire format byte (for testing or simulation)
    pub fn to_byte(self) -> u8 {
        match self {
            Inbound::StartScanning => CMD_START_SCANNING,
            Inbound::Verdict(v) => v.to_byte(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_request_bytes() {
        assert_eq!(ScanRequest::Retry.to_byte(), 20);
        assert_eq!(ScanRequest::Final.to_byte(), 19);
    }

    #[test]
    fn test_request_for_remaining() {
        assert_eq!(ScanRequest::for_remaining(3), ScanRequest::Retry);
        assert_eq!(ScanRequest::for_remaining(2), ScanRequest::Retry);
        assert_eq!(ScanRequest::for_remaining(1), ScanRequest::Final);
        assert!(ScanRequest::for_remaining(1).is_final());
    }

    #[test]
    fn test_verdict_bytes() {
        assert_eq!(Verdict::from_byte(b'A'), Some(Verdict::Accept));
        assert_eq!(Verdict::from_byte(b'R'), Some(Verdict::Reject));
        assert_eq!(Verdict::from_byte(b'D'), Some(Verdict::Duplicate));
        assert_eq!(Verdict::from_byte(b'S'), Some(Verdict::Skip));
        assert_eq!(Verdict::from_byte(b'a'), None);
    }

    #[test]
    fn test_start_scanning_is_not_a_verdict() {
        assert_eq!(Inbound::from_byte(b'B'), Some(Inbound::StartScanning));
        assert_eq!(Verdict::from_byte(b'B'), None);
    }

    proptest! {
        #[test]
        fn prop_unknown_bytes_are_ignored(byte in any::<u8>()) {
            let known = [b'A', b'R', b'D', b'S', b'B'];
            let parsed = Inbound::from_byte(byte);
            prop_assert_eq!(parsed.is_some(), known.contains(&byte));
            if let Some(inbound) = parsed {
                prop_assert_eq!(inbound.to_byte(), byte);
            }
        }

        #[test]
        fn prop_requests_never_collide_with_inbound(remaining in 1u8..=8) {
            let byte = ScanRequest::for_remaining(remaining).to_byte();
            prop_assert!(Inbound::from_byte(byte).is_none());
        }
    }
}
