//! Shared client helpers.

use std::time::Duration;

use log::warn;

use crate::client::api::ApiError;

/// Execute an API call, retrying on transient transport errors (connection
/// refused, timeouts). HTTP-status errors are returned immediately; the
/// server answered, retrying will not change its mind.
pub fn send_with_retries<T, F>(
    mut api_call: F,
    max_attempts: u32,
    delay: Duration,
) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    let mut attempt = 1;
    loop {
        match api_call() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    "API call failed (attempt {}/{}): {}. Retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
