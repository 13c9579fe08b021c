pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Line-oriented device transport.
///
/// Implementations yield one decoded text line per successful poll.
/// `Ok(None)` means no complete line arrived within `timeout` (a quiet
/// poll, not a failure); `Err` means the transport is unusable and the
/// acquisition session must end.
pub trait Transport {
    fn read_line(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
}
