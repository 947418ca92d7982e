//! Debounced search state

use compact_str::CompactString;
use tokio::time::Instant;

use crate::config::MIN_QUERY_LEN;
use crate::util::timer::TimerHandle;

/// The one scheduled submission for a search input.
#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub query: CompactString,
    pub scheduled_at: Instant,
    pub timer: TimerHandle,
}

/// Whether a query of this text may be submitted automatically.
///
/// An empty field submits (it resets the filtered results); one or two
/// characters are too short to be worth a request. Length counts characters,
/// not bytes.
#[inline]
pub fn should_submit(query: &str) -> bool {
    let len = query.chars().count();
    len == 0 || len >= MIN_QUERY_LEN
}
