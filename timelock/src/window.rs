use crate::Error;

/// Furthest a proposal may be scheduled ahead of the current ledger time (7 days).
pub const MAXIMUM_DELAY: u64 = 604_800;

/// How long a due transaction stays executable (1 day).
pub const GRACE_PERIOD: u64 = 86_400;

/// A proposal must be scheduled in `(now, now + MAXIMUM_DELAY]`.
pub fn check_proposal(now: u64, timestamp: u64) -> Result<(), Error> {
    if timestamp <= now || timestamp > now.saturating_add(MAXIMUM_DELAY) {
        return Err(Error::InvalidTimestamp);
    }
    Ok(())
}

/// Execution is allowed in `[timestamp, timestamp + GRACE_PERIOD]`.
pub fn check_execution(now: u64, timestamp: u64) -> Result<(), Error> {
    if now < timestamp {
        return Err(Error::TooEarly);
    }
    if now > timestamp.saturating_add(GRACE_PERIOD) {
        return Err(Error::Expired);
    }
    Ok(())
}

pub fn threshold_met(confirmations: u32, threshold: u32) -> bool {
    confirmations >= threshold
}
