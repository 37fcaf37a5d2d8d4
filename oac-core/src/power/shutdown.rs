//! Shutdown confirmation by line-idle sensing
//!
//! Once the host acknowledges a shutdown the link falls silent and the
//! device samples the host TX line as a plain input. The host counts as
//! off only after the line has read LOW on every sample for the whole
//! confirmation window. Any HIGH sample restarts the window.

/// Result of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutdownProgress {
    /// Keep sampling
    Pending,
    /// Line has been LOW for the whole window
    Confirmed,
    /// Overall wait exceeded without confirmation
    TimedOut,
}

/// Polled replacement for a blocking wait-for-shutdown loop
#[derive(Debug, Clone)]
pub struct LineIdleMonitor {
    started_at: u32,
    low_since: Option<u32>,
    confirm_ms: u32,
    timeout_ms: u32,
}

impl LineIdleMonitor {
    /// Start watching at `now_ms`
    pub fn new(now_ms: u32, confirm_ms: u32, timeout_ms: u32) -> Self {
        Self {
            started_at: now_ms,
            low_since: None,
            confirm_ms,
            timeout_ms,
        }
    }

    /// When the current LOW run began, if the line is LOW
    pub fn low_since(&self) -> Option<u32> {
        self.low_since
    }

    /// Feed one sample of the line taken at `now_ms`
    pub fn sample(&mut self, line_high: bool, now_ms: u32) -> ShutdownProgress {
        if line_high {
            if self.low_since.take().is_some() {
                debug!("host TX went HIGH, restarting confirmation");
            }
        } else {
            let since = *self.low_since.get_or_insert(now_ms);
            if now_ms.wrapping_sub(since) >= self.confirm_ms {
                return ShutdownProgress::Confirmed;
            }
        }

        if now_ms.wrapping_sub(self.started_at) >= self.timeout_ms {
            return ShutdownProgress::TimedOut;
        }
        ShutdownProgress::Pending
    }
}
