use std::cmp;
use std::fmt;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::Error;
use crate::report::Report;
use crate::transport::Transport;
use crate::StatusFlags;

/// Condition a wait is looking for on the status byte.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum WaitMode {
    /// All bits of the mask are set.
    Set,
    /// At least one bit of the mask is clear.
    Clear,
}

impl WaitMode {
    fn is_satisfied(self, report: &Report, mask: u8) -> bool {
        let all_set = report.has_status(mask);
        match self {
            WaitMode::Set => all_set,
            WaitMode::Clear => !all_set,
        }
    }
}

impl fmt::Display for WaitMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WaitMode::Set => f.write_str("set"),
            WaitMode::Clear => f.write_str("clear"),
        }
    }
}

/// Number of polls allowed for a timeout of `seconds`.
///
/// After six sleeps the backoff has spent 0.63 seconds, the remaining polls happen at the
/// capped interval, twice per second with the default config.
fn poll_budget(seconds: u8) -> u32 {
    u32::from(seconds) * 2 + 5
}

/// Polls the device until the status byte satisfies `mode` for `mask`.
///
/// Returns the report that satisfied the condition. A device that signals
/// [`StatusFlags::RESP_TIMEOUT_WAIT`] advertises how many seconds it still needs; when
/// `may_block` is set the first such hint replaces the remaining budget, bounded by
/// [`Config::max_device_timeout_secs`].
pub fn wait_for<T>(
    transport: &mut T,
    mode: WaitMode,
    mask: u8,
    may_block: bool,
    timeout_secs: u8,
    config: &Config,
) -> Result<Report, Error>
where
    T: Transport + ?Sized,
{
    let mut sleep = cmp::min(config.initial_interval, config.max_interval);
    let mut remaining = poll_budget(timeout_secs);
    let mut device_timeout_seen = false;

    loop {
        let report = transport.read_feature_report()?;

        if report.flags().contains(StatusFlags::RESP_TIMEOUT_WAIT) && !device_timeout_seen {
            device_timeout_seen = true;
            let seconds_left = report.sequence();
            debug!(seconds_left, may_block, "Device indicates response timeout");
            if may_block {
                remaining = poll_budget(cmp::min(seconds_left, config.max_device_timeout_secs));
            }
        }

        if mode.is_satisfied(&report, mask) {
            return Ok(report);
        }

        trace!(
            "Status {:02x} has not {} bits {:02x}",
            report.status(),
            mode,
            mask
        );

        remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            return Err(Error::Timeout { mode, mask });
        }

        thread::sleep(sleep);
        sleep = cmp::min(sleep * 2, config.max_interval);
    }
}

/// Waits until the device has cleared every bit of `mask`, using the configured default timeout.
pub fn wait_for_clear<T>(
    transport: &mut T,
    mask: StatusFlags,
    may_block: bool,
    config: &Config,
) -> Result<Report, Error>
where
    T: Transport + ?Sized,
{
    wait_for(
        transport,
        WaitMode::Clear,
        mask.bits(),
        may_block,
        config.default_timeout_secs,
        config,
    )
}

/// Waits until the device has set every bit of `mask`, using the configured default timeout.
pub fn wait_for_set<T>(
    transport: &mut T,
    mask: StatusFlags,
    may_block: bool,
    config: &Config,
) -> Result<Report, Error>
where
    T: Transport + ?Sized,
{
    wait_for(
        transport,
        WaitMode::Set,
        mask.bits(),
        may_block,
        config.default_timeout_secs,
        config,
    )
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::fake_transport::{status, FakeTransport};
    use crate::TransportError;

    fn fast_config() -> Config {
        Config {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            ..Config::default()
        }
    }

    #[test]
    fn budget_for_default_timeout() {
        assert_eq!(poll_budget(2), 9);
        assert_eq!(poll_budget(20), 45);
        assert_eq!(poll_budget(0), 5);
    }

    #[test]
    fn wait_mode_conditions() {
        assert!(WaitMode::Set.is_satisfied(&status(0xc0), 0x40));
        assert!(!WaitMode::Set.is_satisfied(&status(0x80), 0xc0));
        assert!(WaitMode::Clear.is_satisfied(&status(0x40), 0x80));
        assert!(WaitMode::Clear.is_satisfied(&status(0x80), 0xc0));
        assert!(!WaitMode::Clear.is_satisfied(&status(0xc0), 0x80));
    }

    #[test]
    fn set_on_third_read() {
        let mut transport = FakeTransport::with_reads(vec![status(0x00), status(0x80), status(0x40)]);

        let report = wait_for(
            &mut transport,
            WaitMode::Set,
            0x40,
            false,
            2,
            &fast_config(),
        )
        .unwrap();

        assert_eq!(report.status(), 0x40);
        assert_eq!(transport.read_count, 3);
    }

    #[test]
    fn clear_returns_immediately() {
        let mut transport = FakeTransport::with_reads(vec![status(0x40)]);

        let report =
            wait_for_clear(&mut transport, StatusFlags::SLOT_WRITE, false, &fast_config()).unwrap();

        assert_eq!(report.status(), 0x40);
        assert_eq!(transport.read_count, 1);
    }

    #[test]
    fn never_satisfied_times_out() {
        let mut transport = FakeTransport::repeating(status(0x80));
        let started = Instant::now();

        let result = wait_for_clear(&mut transport, StatusFlags::SLOT_WRITE, true, &fast_config());

        assert_matches!(
            result,
            Err(Error::Timeout {
                mode: WaitMode::Clear,
                mask: 0x80
            })
        );
        assert_eq!(transport.read_count, 9);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn default_backoff_bounds_wall_clock() {
        let mut transport = FakeTransport::repeating(status(0x00));
        let started = Instant::now();

        let result = wait_for_set(
            &mut transport,
            StatusFlags::RESP_PENDING,
            false,
            &Config::default(),
        );

        // 10 + 20 + 40 + 80 + 160 + 320 + 500 + 500 ms of sleeps
        assert_matches!(result, Err(Error::Timeout { mode: WaitMode::Set, .. }));
        assert_eq!(transport.read_count, 9);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1630));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn device_timeout_extends_budget_when_blocking() {
        // Waiting for touch with 3 seconds left, budget becomes 3 * 2 - 1 + 6 = 11 polls
        let mut transport = FakeTransport::repeating(status(0x20 | 3));

        let result = wait_for_set(&mut transport, StatusFlags::RESP_PENDING, true, &fast_config());

        assert_matches!(result, Err(Error::Timeout { .. }));
        assert_eq!(transport.read_count, 11);
    }

    #[test]
    fn device_timeout_ignored_without_blocking() {
        let mut transport = FakeTransport::repeating(status(0x20 | 3));

        let result = wait_for_set(&mut transport, StatusFlags::RESP_PENDING, false, &fast_config());

        assert_matches!(result, Err(Error::Timeout { .. }));
        assert_eq!(transport.read_count, 9);
    }

    #[test]
    fn device_timeout_is_capped() {
        let config = Config {
            max_device_timeout_secs: 4,
            ..fast_config()
        };
        let mut transport = FakeTransport::repeating(status(0x20 | 0x1f));

        let result = wait_for_set(&mut transport, StatusFlags::RESP_PENDING, true, &config);

        assert_matches!(result, Err(Error::Timeout { .. }));
        assert_eq!(transport.read_count, 13);
    }

    #[test]
    fn device_timeout_only_honoured_once() {
        // The first hint shrinks the budget to 5 polls, a later, larger hint is ignored
        let mut reads = vec![status(0x20)];
        reads.extend(std::iter::repeat(status(0x20 | 10)).take(20));
        let mut transport = FakeTransport::with_reads(reads);

        let result = wait_for_set(&mut transport, StatusFlags::RESP_PENDING, true, &fast_config());

        assert_matches!(result, Err(Error::Timeout { .. }));
        assert_eq!(transport.read_count, 5);
    }

    #[test]
    fn transport_errors_propagate() {
        let mut transport = FakeTransport::with_reads(vec![]);

        let result = wait_for_set(&mut transport, StatusFlags::RESP_PENDING, false, &fast_config());

        assert_matches!(
            result,
            Err(Error::Transport(TransportError::ShortRead { .. }))
        );
    }
}
