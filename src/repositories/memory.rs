use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EventRepository;
use crate::models::{Attendee, Event, EventChanges, NewEvent};
use crate::utils::error::AppResult;

#[derive(Debug, Default)]
struct Tables {
    // insertion order stands in for the database's default order
    events: Vec<Event>,
    attendees: Vec<Attendee>,
}

impl Tables {
    fn with_count(&self, event: &Event) -> Event {
        let attendee_count = self
            .attendees
            .iter()
            .filter(|a| a.event_id == event.id)
            .count() as i64;
        Event {
            attendee_count,
            ..event.clone()
        }
    }

    fn select<F>(&self, predicate: F) -> Vec<Event>
    where
        F: Fn(&Event) -> bool,
    {
        self.events
            .iter()
            .filter(|&e| predicate(e))
            .map(|e| self.with_count(e))
            .collect()
    }
}

/// Vec-backed repository that mirrors the Postgres schema's constraints,
/// including the unique (event, user) attendee pair and cascade delete.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    tables: RwLock<Tables>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attendee_rows(&self, event_id: Uuid) -> usize {
        self.tables
            .read()
            .await
            .attendees
            .iter()
            .filter(|a| a.event_id == event_id)
            .count()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: NewEvent) -> AppResult<Event> {
        let now = Utc::now();
        let created = Event {
            id: Uuid::new_v4(),
            title: event.title,
            location: event.location,
            start_date: event.start_date,
            owner_id: event.owner_id,
            image_url: event.image_url,
            attendee_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.events.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.with_count(e)))
    }

    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<Event>> {
        Ok(self
            .tables
            .read()
            .await
            .select(|e| e.owner_id == owner_id))
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Event>> {
        let mut events = self
            .tables
            .read()
            .await
            .select(|e| e.start_date >= from && e.start_date < to);
        events.sort_by_key(|e| e.start_date);
        Ok(events)
    }

    async fn find_attended_by(&self, user_id: &str) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.select(|e| {
            tables
                .attendees
                .iter()
                .any(|a| a.event_id == e.id && a.user_id == user_id)
        }))
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        let Some(event) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        event.title = changes.title;
        event.location = changes.location;
        event.start_date = changes.start_date;
        event.image_url = changes.image_url;
        event.updated_at = Utc::now();

        let updated = event.clone();
        Ok(Some(tables.with_count(&updated)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        if tables.events.len() == before {
            return Ok(false);
        }

        tables.attendees.retain(|a| a.event_id != id);
        Ok(true)
    }

    async fn find_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<Option<Attendee>> {
        Ok(self
            .tables
            .read()
            .await
            .attendees
            .iter()
            .find(|a| a.event_id == event_id && a.user_id == user_id)
            .cloned())
    }

    async fn add_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let event_exists = tables.events.iter().any(|e| e.id == event_id);
        let duplicate = tables
            .attendees
            .iter()
            .any(|a| a.event_id == event_id && a.user_id == user_id);
        if !event_exists || duplicate {
            return Ok(false);
        }

        tables.attendees.push(Attendee {
            id: Uuid::new_v4(),
            event_id,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_attendee(&self, attendee_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.attendees.len();
        tables.attendees.retain(|a| a.id != attendee_id);
        Ok(tables.attendees.len() < before)
    }
}
