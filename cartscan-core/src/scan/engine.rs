//! Request/verdict exchange and retry policy

use embedded_hal::delay::DelayNs;

use cartscan_protocol::{ScanRequest, Verdict};

use crate::config::ScanConfig;
use crate::state::{CycleOutcome, Fault, Lane, RunContext};
use crate::traits::{Board, ScanLink, TextDisplay};

const READING: (&str, &str) = ("Reading QR", "Hold steady...");
const RETRYING: (&str, &str) = ("Retrying", "");

/// Scan protocol engine
#[derive(Debug, Clone, Copy)]
pub struct ScanEngine {
    config: ScanConfig,
}

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan the cartridge at the scan position
    ///
    /// Returns the lane it must leave through, `ScanTimeout` if the
    /// peripheral never answered any attempt, or `ScanError` if it only
    /// ever answered with skips.
    pub fn scan<IO, L, DS, D>(
        &self,
        board: &mut Board<IO, L, DS, D>,
        ctx: &mut RunContext,
    ) -> Result<Lane, Fault>
    where
        L: ScanLink,
        DS: TextDisplay,
        D: DelayNs,
    {
        let mut remaining = self.config.attempts;
        let mut attempt = 0;
        let mut answered = false;

        while remaining > 0 {
            attempt += 1;
            board.display.show(READING.0, READING.1);

            let request = ScanRequest::for_remaining(remaining);
            let outcome = self.attempt(&mut board.link, &mut board.delay, ctx, attempt, request);
            if let Some(lane) = outcome.lane() {
                return Ok(lane);
            }
            if outcome == CycleOutcome::Skip {
                answered = true;
            }

            if request.is_final() {
                break;
            }
            remaining -= 1;
            warn!("cartridge {} not read, {} attempts left", ctx.counters.count, remaining);
            board.display.show(RETRYING.0, RETRYING.1);
            board.delay.delay_ms(self.config.retry_delay_ms);
        }

        if answered {
            Err(Fault::ScanError)
        } else {
            Err(Fault::ScanTimeout)
        }
    }

    /// One request and its verdict
    ///
    /// Anything already waiting on the link is discarded first so a late
    /// verdict for an earlier attempt cannot answer this one.
    pub fn attempt<L: ScanLink, D: DelayNs>(
        &self,
        link: &mut L,
        delay: &mut D,
        ctx: &mut RunContext,
        attempt: u8,
        request: ScanRequest,
    ) -> CycleOutcome {
        let dropped = link.drain();
        if dropped > 0 {
            warn!("dropped {} stale bytes before scan request", dropped);
        }

        let pending = ctx.open_request(attempt);
        link.write_byte(request.to_byte());
        info!(
            "scan request {=u8:#x} for cartridge {} attempt {}",
            request.to_byte(),
            pending.ordinal,
            pending.attempt
        );
        delay.delay_ms(self.config.busy_settle_ms);

        let outcome = match self.await_verdict(link, delay) {
            Some(verdict) => {
                info!("verdict {} for cartridge {}", verdict, pending.ordinal);
                delay.delay_ms(self.config.after_result_ms);
                CycleOutcome::from_verdict(verdict)
            }
            None => {
                warn!("no verdict for cartridge {} within {} ms", pending.ordinal, self.config.max_wait_ms);
                CycleOutcome::Error
            }
        };

        ctx.resolve_request();
        outcome
    }

    /// Poll for a verdict byte until the wait window closes
    ///
    /// One byte is taken per poll. The window is tick-counted: each poll
    /// adds one period whether or not the link took longer to service.
    pub fn await_verdict<L: ScanLink, D: DelayNs>(
        &self,
        link: &mut L,
        delay: &mut D,
    ) -> Option<Verdict> {
        let mut waited = 0u32;

        loop {
            if let Some(byte) = link.try_read_byte() {
                match Verdict::from_byte(byte) {
                    Some(verdict) => return Some(verdict),
                    None => debug!("ignoring byte {=u8:#x} while awaiting verdict", byte),
                }
            }

            if waited >= self.config.max_wait_ms {
                return None;
            }
            delay.delay_ms(self.config.poll_period_ms);
            waited = waited.saturating_add(self.config.poll_period_ms);
        }
    }
}
