use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::EventRepository;
use crate::models::{Attendee, Event, EventChanges, NewEvent};
use crate::utils::error::AppResult;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const EVENT_COLUMNS: &str = r#"
    e.id,
    e.title,
    e.location,
    e.start_date,
    e.owner_id,
    e.image_url,
    (SELECT COUNT(*) FROM attendees a WHERE a.event_id = e.id) AS attendee_count,
    e.created_at,
    e.updated_at
"#;

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: NewEvent) -> AppResult<Event> {
        let created = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, title, location, start_date, owner_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id,
                title,
                location,
                start_date,
                owner_id,
                image_url,
                0::BIGINT AS attendee_count,
                created_at,
                updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.location)
        .bind(event.start_date)
        .bind(&event.owner_id)
        .bind(&event.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        let query = format!("SELECT {} FROM events e WHERE e.id = $1", EVENT_COLUMNS);
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<Event>> {
        let query = format!(
            "SELECT {} FROM events e WHERE e.owner_id = $1",
            EVENT_COLUMNS
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Event>> {
        let query = format!(
            "SELECT {} FROM events e \
             WHERE e.start_date >= $1 AND e.start_date < $2 \
             ORDER BY e.start_date ASC",
            EVENT_COLUMNS
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn find_attended_by(&self, user_id: &str) -> AppResult<Vec<Event>> {
        let query = format!(
            "SELECT {} FROM events e \
             WHERE EXISTS (SELECT 1 FROM attendees m WHERE m.event_id = e.id AND m.user_id = $1)",
            EVENT_COLUMNS
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<Option<Event>> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = $2,
                location = $3,
                start_date = $4,
                image_url = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.location)
        .bind(changes.start_date)
        .bind(&changes.image_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // attendees go with the event through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<Option<Attendee>> {
        let attendee = sqlx::query_as::<_, Attendee>(
            r#"
            SELECT id, event_id, user_id, created_at
            FROM attendees
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    async fn add_attendee(&self, event_id: Uuid, user_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendees (id, event_id, user_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(sqlx::Error::Database(db))
                if matches!(
                    db.code().as_deref(),
                    Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION)
                ) =>
            {
                tracing::debug!(%event_id, user_id, code = ?db.code(), "Attendee insert rejected");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_attendee(&self, attendee_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = $1")
            .bind(attendee_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
