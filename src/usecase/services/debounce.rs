use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// Hands out tickets; only the most recent one is still live.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
}

impl Debouncer {
    pub fn bump(&mut self) -> DebounceTicket {
        self.generation += 1;
        DebounceTicket(self.generation)
    }

    pub fn is_latest(&self, ticket: DebounceTicket) -> bool {
        ticket.0 == self.generation
    }
}

/// Waits out the quiet window, then reports whether the caller's ticket is
/// still the latest one.
pub async fn wait_until_settled<F>(window: Duration, still_latest: F) -> bool
where
    F: FnOnce() -> bool,
{
    tokio::time::sleep(window).await;
    still_latest()
}
