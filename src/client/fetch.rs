use tracing::{event, Level};

use super::api::ClientError;

/// Identifies one issued request. Only the most recently issued ticket may
/// resolve a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What a view should render for a fetched value.
#[derive(Debug, PartialEq)]
pub enum Phase<'a, T> {
    Loading,
    Failed,
    Ready(&'a T),
}

/// Tracks the latest result of a query that may be re-issued any number of times.
#[derive(Debug)]
pub struct FetchState<T> {
    data: Option<T>,
    failed: bool,
    issued: u64,
    in_flight: bool,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState {
            data: None,
            failed: false,
            issued: 0,
            in_flight: false,
        }
    }
}

impl<T> FetchState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.in_flight = true;
        Ticket(self.issued)
    }

    /// Stores `result` unless a newer request was issued after `ticket`.
    /// Returns whether the result was applied.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<T, ClientError>) -> bool {
        if ticket.0 != self.issued {
            event!(
                Level::DEBUG,
                "Discarding stale response {} (latest is {})",
                ticket.0,
                self.issued
            );
            return false;
        }

        self.in_flight = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.failed = false;
            }
            Err(e) => {
                event!(Level::ERROR, "Fetch failed: {}", e);
                self.failed = true;
            }
        }
        true
    }

    pub fn phase(&self) -> Phase<'_, T> {
        if self.failed {
            return Phase::Failed;
        }
        match &self.data {
            Some(data) => Phase::Ready(data),
            None if self.in_flight || self.issued == 0 => Phase::Loading,
            None => Phase::Failed,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase(), Phase::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_until_first_response() {
        let mut state = FetchState::<Vec<u32>>::new();
        assert_eq!(state.phase(), Phase::Loading);

        let ticket = state.begin();
        assert_eq!(state.phase(), Phase::Loading);

        state.resolve(ticket, Ok(vec![1, 2]));
        assert_eq!(state.phase(), Phase::Ready(&vec![1, 2]));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut state = FetchState::<&str>::new();
        let first = state.begin();
        let second = state.begin();

        assert!(state.resolve(second, Ok("new")));
        assert!(!state.resolve(first, Ok("old")));
        assert_eq!(state.data(), Some(&"new"));
    }

    #[test]
    fn failure_shows_error_even_with_cached_data() {
        let mut state = FetchState::<u32>::new();
        let ticket = state.begin();
        state.resolve(ticket, Ok(1));

        let ticket = state.begin();
        state.resolve(
            ticket,
            Err(ClientError::Status {
                status: 500,
                message: "Error retrieving products".to_string(),
            }),
        );

        assert_eq!(state.phase(), Phase::Failed);
    }

    #[test]
    fn refetch_keeps_showing_previous_data() {
        let mut state = FetchState::<u32>::new();
        let ticket = state.begin();
        state.resolve(ticket, Ok(7));

        state.begin();
        assert_eq!(state.phase(), Phase::Ready(&7));
        assert!(state.is_in_flight());
    }
}
