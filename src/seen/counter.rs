/// Local, advisory copy of the remote unread count.
///
/// The first successful fetch after a session starts is discarded and shown
/// as zero: the remote counter can lag behind reads made in another client.
/// Every later fetch is taken as-is.
#[derive(Debug, Clone, Default)]
pub struct UnreadCounter {
    value: u64,
    bootstrapped: bool,
}

impl UnreadCounter {
    /// A counter for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session: zero the count and re-arm the first-fetch discard.
    pub fn session_start(&mut self) {
        self.value = 0;
        self.bootstrapped = false;
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Whether a fetch has already been accepted in this session.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Apply a successfully fetched remote value and return what callers should show.
    /// Failed fetches never reach here, so they do not use up the discard.
    pub fn apply_fetch(&mut self, remote: u64) -> u64 {
        if self.bootstrapped {
            self.value = remote;
        } else {
            tracing::debug!(remote, "Discarding first unread count of the session");
            self.bootstrapped = true;
            self.value = 0;
        }
        self.value
    }

    /// Subtract newly-read items, never going below zero.
    pub fn decrement(&mut self, by: u64) -> u64 {
        self.value = self.value.saturating_sub(by);
        self.value
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

}
