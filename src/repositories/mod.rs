use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Attendee, Event, EventChanges, NewEvent};
use crate::utils::error::AppResult;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryEventRepository;
pub use postgres::PgEventRepository;

/// Event and attendee persistence. Every call is a single write-through
/// round-trip; nothing is batched.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: NewEvent) -> AppResult<Event>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>>;

    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<Event>>;

    /// Events with `from <= start_date < to`, ascending by start date.
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Event>>;

    /// Events the user holds an attendee record for.
    async fn find_attended_by(&self, user_id: &str) -> AppResult<Vec<Event>>;

    /// Overwrites the mutable columns and returns the row as re-read after
    /// the write, or `None` if the event no longer exists.
    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<Option<Event>>;

    /// Deletes the event together with its attendees.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    async fn find_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<Option<Attendee>>;

    /// Returns `false` when the (event, user) pair already exists or the
    /// event is gone.
    async fn add_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<bool>;

    async fn remove_attendee(&self, attendee_id: Uuid) -> AppResult<bool>;
}
