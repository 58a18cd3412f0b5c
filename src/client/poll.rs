//! The wait loop: poll simulation status and stream new engine log lines
//! until a terminal state or a deadline.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::debug;

use crate::client::api::{self, ApiError, Configuration};
use crate::client::utils::send_with_retries;
use crate::models::Simulation;

/// Log lines fetched per poll; enough to cover anything emitted between
/// polls at the default interval.
const LOG_FETCH_LIMIT: usize = 20;

/// Retry budget for API calls made inside the wait loop.
const POLL_RETRY_ATTEMPTS: u32 = 3;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(15),
        }
    }
}

/// How the wait ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The simulation reached completed or failed.
    Finished(Simulation),
    /// The deadline passed first; carries the last state seen, if any.
    TimedOut(Option<Simulation>),
}

/// Poll `GET /simulations/{id}` and its logs until the simulation reaches a
/// terminal state or `opts.timeout` elapses.
///
/// New log lines are deduplicated on `(timestamp, message)` and emitted
/// oldest-first through `sink` as `(short_timestamp, message)` pairs.
/// Transient transport errors inside the loop are retried; HTTP errors
/// abort the wait.
pub fn wait_for_completion(
    config: &Configuration,
    id: &str,
    opts: &WaitOptions,
    sink: &mut dyn FnMut(&str, &str),
) -> Result<WaitOutcome, ApiError> {
    let deadline = Instant::now() + opts.timeout;
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut last_seen: Option<Simulation> = None;

    loop {
        let simulation = send_with_retries(
            || api::get_simulation(config, id),
            POLL_RETRY_ATTEMPTS,
            POLL_RETRY_DELAY,
        )?;
        debug!("simulation {} status: {}", id, simulation.status);

        let logs = send_with_retries(
            || api::get_simulation_logs(config, id, LOG_FETCH_LIMIT),
            POLL_RETRY_ATTEMPTS,
            POLL_RETRY_DELAY,
        )?;
        // The API returns newest first; replay unseen lines oldest-first.
        for entry in logs.iter().rev() {
            let key = (entry.timestamp.clone(), entry.message.clone());
            if seen.insert(key) {
                sink(&short_timestamp(&entry.timestamp), &entry.message);
            }
        }

        if simulation.status.is_terminal() {
            return Ok(WaitOutcome::Finished(simulation));
        }
        last_seen = Some(simulation);

        if Instant::now() + opts.poll_interval > deadline {
            return Ok(WaitOutcome::TimedOut(last_seen));
        }
        std::thread::sleep(opts.poll_interval);
    }
}

/// Shorten an RFC 3339 timestamp to `HH:MM:SS` for log display. Falls back
/// to the raw time portion (or the raw prefix) when parsing fails.
pub fn short_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        return dt.format("%H:%M:%S").to_string();
    }
    if let Some((_, time)) = ts.split_once('T') {
        if time.contains(':') {
            return time.chars().take(8).collect();
        }
    }
    ts.chars().take(8).collect()
}
