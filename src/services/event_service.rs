use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{EventChanges, EventRequest, EventResponse, NewEvent};
use crate::repositories::EventRepository;
use crate::storage::{blob_name_from_reference, BlobStore};
use crate::utils::error::{AppError, AppResult};

pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// An image file received from a client.
#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Event operations on behalf of an authenticated caller.
///
/// Blob deletions triggered by update, delete and upload are best-effort:
/// a failed delete is logged and discarded and never fails the enclosing
/// operation. Do not turn these into hard failures. Only blobs whose name
/// was issued to the caller by [`EventService::upload_image`] are deleted.
pub struct EventService {
    repository: Arc<dyn EventRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl EventService {
    pub fn new(repository: Arc<dyn EventRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repository, blobs }
    }

    pub async fn create_event(
        &self,
        owner_id: &str,
        request: EventRequest,
    ) -> AppResult<EventResponse> {
        let draft = request.validate()?;

        let created = self
            .repository
            .create(NewEvent {
                owner_id: owner_id.to_string(),
                title: draft.title,
                location: draft.location,
                start_date: draft.start_date,
                image_url: draft.image_url,
            })
            .await?;

        tracing::info!(event_id = %created.id, owner_id, "Event created");
        Ok(created.into())
    }

    pub async fn get_event(&self, id: Uuid) -> AppResult<Option<EventResponse>> {
        Ok(self.repository.find_by_id(id).await?.map(Into::into))
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<EventResponse>> {
        let events = self.repository.find_by_owner(owner_id).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    pub async fn list_by_month(&self, year: i32, month: u32) -> AppResult<Vec<EventResponse>> {
        let (from, to) = month_bounds(year, month)?;
        let events = self.repository.find_starting_between(from, to).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    pub async fn list_attending(&self, user_id: &str) -> AppResult<Vec<EventResponse>> {
        let events = self.repository.find_attended_by(user_id).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    pub async fn attending_event_ids(&self, user_id: &str) -> AppResult<Vec<Uuid>> {
        let events = self.repository.find_attended_by(user_id).await?;
        Ok(events.into_iter().map(|e| e.id).collect())
    }

    /// Ownership is checked before the payload, so a non-owner gets
    /// `Forbidden` whatever they send.
    pub async fn update_event(
        &self,
        id: Uuid,
        caller_id: &str,
        request: EventRequest,
    ) -> AppResult<EventResponse> {
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .filter(|e| e.owner_id == caller_id)
            .ok_or_else(|| AppError::Forbidden("You can only update your own events".into()))?;

        let draft = request.validate()?;

        let mut image_url = existing.image_url.clone();
        if let Some(new_url) = draft.image_url {
            if existing.image_url.as_deref() != Some(new_url.as_str()) {
                if let Some(old_url) = existing.image_url.as_deref() {
                    self.delete_blob_best_effort(caller_id, old_url).await;
                }
                image_url = Some(new_url);
            }
        }

        let changes = EventChanges {
            title: draft.title,
            location: draft.location,
            start_date: draft.start_date,
            image_url,
        };

        let updated = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found", id)))?;

        tracing::info!(event_id = %id, owner_id = caller_id, "Event updated");
        Ok(updated.into())
    }

    pub async fn delete_event(&self, id: Uuid, caller_id: &str) -> AppResult<bool> {
        let Some(existing) = self.repository.find_by_id(id).await? else {
            return Ok(false);
        };
        if existing.owner_id != caller_id {
            return Ok(false);
        }

        if let Some(image_url) = existing.image_url.as_deref().filter(|u| !u.is_empty()) {
            self.delete_blob_best_effort(caller_id, image_url).await;
        }

        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::info!(event_id = %id, owner_id = caller_id, "Event deleted");
        }
        Ok(deleted)
    }

    /// Validates and stores an event image, returning its public URL.
    /// Invalid files are rejected before the blob store is contacted.
    pub async fn upload_image(
        &self,
        caller_id: &str,
        upload: ImageUpload<'_>,
        delete_old_image: bool,
        old_image_url: Option<&str>,
    ) -> AppResult<String> {
        let extension = validate_image(&upload)?;

        if delete_old_image {
            if let Some(old_url) = old_image_url.filter(|u| !u.is_empty()) {
                self.delete_blob_best_effort(caller_id, old_url).await;
            }
        }

        let blob_name = format!(
            "{}-{}{}",
            sanitize_for_blob_name(caller_id),
            Uuid::new_v4(),
            extension
        );
        let url = self
            .blobs
            .upload(&blob_name, upload.bytes, upload.content_type)
            .await?;

        tracing::info!(blob = %blob_name, size = upload.bytes.len(), "Event image uploaded");
        Ok(url)
    }

    pub async fn attend_event(&self, user_id: &str, event_id: Uuid) -> AppResult<bool> {
        if self.repository.find_by_id(event_id).await?.is_none() {
            return Ok(false);
        }
        if self
            .repository
            .find_attendee(event_id, user_id)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        // the unique (event, user) constraint settles concurrent attends
        let added = self.repository.add_attendee(event_id, user_id).await?;
        if added {
            tracing::info!(%event_id, user_id, "Attendee added");
        }
        Ok(added)
    }

    pub async fn unattend_event(&self, user_id: &str, event_id: Uuid) -> AppResult<bool> {
        let Some(attendee) = self.repository.find_attendee(event_id, user_id).await? else {
            return Ok(false);
        };

        let removed = self.repository.remove_attendee(attendee.id).await?;
        if removed {
            tracing::info!(%event_id, user_id, "Attendee removed");
        }
        Ok(removed)
    }

    async fn delete_blob_best_effort(&self, caller_id: &str, reference: &str) {
        let owned = blob_name_from_reference(reference)
            .map(|name| is_blob_owned_by(&name, caller_id))
            .unwrap_or(false);
        if !owned {
            tracing::warn!(reference, caller_id, "Skipping delete of image blob not owned by caller");
            return;
        }

        if let Err(e) = self.blobs.delete(reference).await {
            tracing::warn!(error = %e, reference, "Failed to delete image blob, continuing");
        }
    }
}

/// Returns the lower-cased extension including the leading dot.
fn validate_image(upload: &ImageUpload<'_>) -> AppResult<String> {
    if upload.bytes.is_empty() {
        return Err(AppError::ValidationError("No file provided.".into()));
    }

    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::ValidationError(
            "File too large. Max size is 4MB.".into(),
        ));
    }

    let extension = file_extension(upload.file_name);

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::ValidationError(
            "Invalid file format. Only .jpg, .jpeg, and .png are allowed.".into(),
        ));
    }

    Ok(extension)
}

/// Lower-cased extension of the last path component, dot included. A bare
/// `.png` counts as the extension `.png`.
fn file_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    base.rfind('.')
        .map(|dot| base[dot..].to_lowercase())
        .unwrap_or_default()
}

/// Names issued by `upload_image` have the shape `{caller}-{uuid}{ext}`.
fn is_blob_owned_by(name: &str, caller_id: &str) -> bool {
    let prefix = format!("{}-", sanitize_for_blob_name(caller_id));
    let Some(rest) = name.strip_prefix(&prefix) else {
        return false;
    };
    let (Some(id), Some(extension)) = (rest.get(..36), rest.get(36..)) else {
        return false;
    };

    Uuid::parse_str(id).is_ok() && ALLOWED_IMAGE_EXTENSIONS.contains(&extension)
}

fn sanitize_for_blob_name(caller_id: &str) -> String {
    caller_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Half-open UTC range covering one calendar month.
fn month_bounds(year: i32, month: u32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || AppError::ValidationError(format!("Invalid month {}-{}", year, month));

    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1).ok_or_else(invalid)?, 1)
    } else {
        (year, month + 1)
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

    Ok((
        Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN)),
        Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryEventRepository;
    use crate::storage::MemoryBlobStore;

    struct Fixture {
        service: EventService,
        repository: Arc<InMemoryEventRepository>,
        blobs: Arc<MemoryBlobStore>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryEventRepository::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = EventService::new(repository.clone(), blobs.clone());
        Fixture {
            service,
            repository,
            blobs,
        }
    }

    fn request(title: &str, start: &str, image_url: Option<&str>) -> EventRequest {
        EventRequest {
            title: Some(title.to_string()),
            location: Some("Online".to_string()),
            start_date: Some(start.to_string()),
            image_url: image_url.map(str::to_string),
        }
    }

    fn owned_blob_name(caller_id: &str) -> String {
        format!("{}-{}.png", caller_id, Uuid::new_v4())
    }

    fn png(bytes: &[u8]) -> ImageUpload<'_> {
        ImageUpload {
            file_name: "photo.png",
            content_type: "image/png",
            bytes,
        }
    }

    #[tokio::test]
    async fn test_attendance_scenario() {
        let f = fixture();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", None))
            .await
            .unwrap();

        let fetched = f.service.get_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.attendee_count, 0);
        assert_eq!(fetched.owner_id, "u1");

        assert!(f.service.attend_event("u2", created.id).await.unwrap());
        let fetched = f.service.get_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.attendee_count, 1);

        assert!(!f.service.attend_event("u2", created.id).await.unwrap());
        assert_eq!(f.repository.attendee_rows(created.id).await, 1);

        assert!(f.service.unattend_event("u2", created.id).await.unwrap());
        let fetched = f.service.get_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.attendee_count, 0);

        assert!(!f.service.unattend_event("u2", created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_attend_missing_event_fails() {
        let f = fixture();
        assert!(!f.service.attend_event("u2", Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden_and_changes_nothing() {
        let f = fixture();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", None))
            .await
            .unwrap();

        let err = f
            .service
            .update_event(created.id, "u2", request("Hijacked", "2025-01-01", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // invalid payloads from non-owners are still Forbidden
        let err = f
            .service
            .update_event(created.id, "u2", EventRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let fetched = f.service.get_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_missing_event_is_forbidden() {
        let f = fixture();
        let err = f
            .service
            .update_event(Uuid::new_v4(), "u1", request("x", "2024-06-01", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_overwrites_fields() {
        let f = fixture();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", None))
            .await
            .unwrap();

        let updated = f
            .service
            .update_event(created.id, "u1", request("Renamed", "2024-07-15T10:00:00Z", None))
            .await
            .unwrap();

        assert_eq!(updated.owner_id, "u1");
        assert_eq!(updated.title, "Renamed");
        assert_eq!(
            updated.start_date,
            Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_deletes_old_blob() {
        let f = fixture();
        let old_name = owned_blob_name("u1");
        let old_url = f.blobs.insert(&old_name, b"old").await;
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&old_url)))
            .await
            .unwrap();

        let new_url = MemoryBlobStore::url_for("u1-new.png");
        let updated = f
            .service
            .update_event(created.id, "u1", request("Meetup", "2024-06-01", Some(&new_url)))
            .await
            .unwrap();

        assert_eq!(updated.image_url.as_deref(), Some(new_url.as_str()));
        assert!(!f.blobs.contains(&old_name).await);
    }

    #[tokio::test]
    async fn test_update_without_new_image_keeps_existing() {
        let f = fixture();
        let old_name = owned_blob_name("u1");
        let old_url = f.blobs.insert(&old_name, b"old").await;
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&old_url)))
            .await
            .unwrap();

        for image in [None, Some(""), Some(old_url.as_str())] {
            let updated = f
                .service
                .update_event(created.id, "u1", request("Meetup", "2024-06-01", image))
                .await
                .unwrap();
            assert_eq!(updated.image_url.as_deref(), Some(old_url.as_str()));
        }

        assert_eq!(f.blobs.delete_attempts(), 0);
        assert!(f.blobs.contains(&old_name).await);
    }

    #[tokio::test]
    async fn test_update_succeeds_when_old_blob_delete_fails() {
        let f = fixture();
        let old_name = owned_blob_name("u1");
        let old_url = f.blobs.insert(&old_name, b"old").await;
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&old_url)))
            .await
            .unwrap();
        f.blobs.fail_deletes(true);

        let new_url = MemoryBlobStore::url_for("u1-new.png");
        let updated = f
            .service
            .update_event(created.id, "u1", request("Meetup", "2024-06-01", Some(&new_url)))
            .await
            .unwrap();

        assert_eq!(updated.image_url.as_deref(), Some(new_url.as_str()));
        assert_eq!(f.blobs.delete_attempts(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_owner_removes_event_even_if_blob_delete_fails() {
        let f = fixture();
        let name = owned_blob_name("u1");
        let url = f.blobs.insert(&name, b"pic").await;
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&url)))
            .await
            .unwrap();
        f.blobs.fail_deletes(true);

        assert!(f.service.delete_event(created.id, "u1").await.unwrap());
        assert_eq!(f.blobs.delete_attempts(), 1);
        assert!(f.service.get_event(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_image_blob() {
        let f = fixture();
        let name = owned_blob_name("u1");
        let url = f.blobs.insert(&name, b"pic").await;
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&url)))
            .await
            .unwrap();

        assert!(f.service.delete_event(created.id, "u1").await.unwrap());
        assert!(!f.blobs.contains(&name).await);
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_fails() {
        let f = fixture();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", None))
            .await
            .unwrap();

        assert!(!f.service.delete_event(created.id, "u2").await.unwrap());
        assert!(!f.service.delete_event(Uuid::new_v4(), "u1").await.unwrap());
        assert!(f.service.get_event(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cascades_attendees() {
        let f = fixture();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", None))
            .await
            .unwrap();
        f.service.attend_event("u2", created.id).await.unwrap();

        f.service.delete_event(created.id, "u1").await.unwrap();

        assert_eq!(f.repository.attendee_rows(created.id).await, 0);
        assert!(f.service.list_attending("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_month_filters_and_sorts() {
        let f = fixture();
        for (title, start) in [
            ("late june", "2024-06-30T23:59:59Z"),
            ("may", "2024-05-31T23:59:59Z"),
            ("early june", "2024-06-01T00:00:00Z"),
            ("july", "2024-07-01T00:00:00Z"),
            ("mid june", "2024-06-15T12:00:00Z"),
        ] {
            f.service
                .create_event("u1", request(title, start, None))
                .await
                .unwrap();
        }

        let titles: Vec<String> = f
            .service
            .list_by_month(2024, 6)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["early june", "mid june", "late june"]);

        let december = f.service.list_by_month(2024, 12).await.unwrap();
        assert!(december.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_month_rejects_invalid_month() {
        let f = fixture();
        for month in [0, 13] {
            let err = f.service.list_by_month(2024, month).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn test_list_by_owner_and_attending() {
        let f = fixture();
        let a = f
            .service
            .create_event("u1", request("a", "2024-06-01", None))
            .await
            .unwrap();
        let b = f
            .service
            .create_event("u2", request("b", "2024-06-02", None))
            .await
            .unwrap();
        f.service.attend_event("u3", b.id).await.unwrap();

        let mine: Vec<Uuid> = f
            .service
            .list_by_owner("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(mine, vec![a.id]);

        assert_eq!(f.service.attending_event_ids("u3").await.unwrap(), vec![b.id]);
        let attending = f.service.list_attending("u3").await.unwrap();
        assert_eq!(attending.len(), 1);
        assert_eq!(attending[0].attendee_count, 1);
        assert!(f.service.attending_event_ids("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let f = fixture();
        let err = f
            .service
            .create_event("u1", request("", "2024-06-01", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(f.service.list_by_owner("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_files_without_contacting_store() {
        let f = fixture();
        let oversized = vec![0u8; MAX_IMAGE_BYTES + 1];

        let cases = [
            ImageUpload {
                file_name: "photo.gif",
                content_type: "image/gif",
                bytes: b"gif",
            },
            ImageUpload {
                file_name: "photo",
                content_type: "image/png",
                bytes: b"png",
            },
            png(&oversized),
            png(b""),
        ];

        for upload in cases {
            let err = f
                .service
                .upload_image("u1", upload, true, Some("https://blobs.test/eventimages/x.png"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        assert_eq!(f.blobs.upload_count(), 0);
        assert_eq!(f.blobs.delete_attempts(), 0);
    }

    #[tokio::test]
    async fn test_upload_accepts_exact_limit_and_uppercase_extension() {
        let f = fixture();
        let at_limit = vec![1u8; MAX_IMAGE_BYTES];
        let upload = ImageUpload {
            file_name: "Holiday.JPEG",
            content_type: "image/jpeg",
            bytes: &at_limit,
        };

        let url = f.service.upload_image("u1", upload, false, None).await.unwrap();

        assert!(url.starts_with(&MemoryBlobStore::url_for("u1-")));
        assert!(url.ends_with(".jpeg"));
        let name = url.rsplit('/').next().unwrap();
        let stored = f.blobs.get(name).await.unwrap();
        assert_eq!(stored.content_type, "image/jpeg");
        assert_eq!(stored.bytes.len(), MAX_IMAGE_BYTES);
    }

    #[tokio::test]
    async fn test_upload_deletes_old_image_only_when_asked() {
        let f = fixture();
        let old_name = owned_blob_name("u1");
        let old_url = f.blobs.insert(&old_name, b"old").await;

        f.service
            .upload_image("u1", png(b"new"), false, Some(&old_url))
            .await
            .unwrap();
        assert!(f.blobs.contains(&old_name).await);

        f.service
            .upload_image("u1", png(b"newer"), true, Some(&old_url))
            .await
            .unwrap();
        assert!(!f.blobs.contains(&old_name).await);
        assert_eq!(f.blobs.len().await, 2);
    }

    #[tokio::test]
    async fn test_upload_survives_failed_old_image_delete() {
        let f = fixture();
        let old_url = MemoryBlobStore::url_for(&owned_blob_name("u1"));
        f.blobs.fail_deletes(true);

        let url = f
            .service
            .upload_image("u1", png(b"new"), true, Some(&old_url))
            .await
            .unwrap();
        assert!(url.ends_with(".png"));
        assert_eq!(f.blobs.delete_attempts(), 1);
    }

    #[tokio::test]
    async fn test_upload_never_deletes_another_callers_blob() {
        let f = fixture();
        let victim_url = f
            .service
            .upload_image("victim", png(b"mine"), false, None)
            .await
            .unwrap();
        let victim_name = victim_url.rsplit('/').next().unwrap().to_string();

        f.service
            .upload_image("attacker", png(b"evil"), true, Some(&victim_url))
            .await
            .unwrap();

        assert!(f.blobs.contains(&victim_name).await);
        assert_eq!(f.blobs.delete_attempts(), 0);

        // a caller id that extends the victim's is not the victim
        f.service
            .upload_image("victim-x", png(b"evil"), true, Some(&victim_url))
            .await
            .unwrap();
        assert!(f.blobs.contains(&victim_name).await);

        f.service
            .upload_image("victim", png(b"newer"), true, Some(&victim_url))
            .await
            .unwrap();
        assert!(!f.blobs.contains(&victim_name).await);
    }

    #[tokio::test]
    async fn test_update_and_delete_skip_blobs_not_issued_to_owner() {
        let f = fixture();
        let foreign = f
            .service
            .upload_image("u2", png(b"theirs"), false, None)
            .await
            .unwrap();
        let foreign_name = foreign.rsplit('/').next().unwrap().to_string();
        let created = f
            .service
            .create_event("u1", request("Meetup", "2024-06-01", Some(&foreign)))
            .await
            .unwrap();

        let new_url = MemoryBlobStore::url_for(&owned_blob_name("u1"));
        f.service
            .update_event(created.id, "u1", request("Meetup", "2024-06-01", Some(&new_url)))
            .await
            .unwrap();
        assert!(f.blobs.contains(&foreign_name).await);

        let second = f
            .service
            .create_event("u1", request("Other", "2024-06-02", Some(&foreign)))
            .await
            .unwrap();
        assert!(f.service.delete_event(second.id, "u1").await.unwrap());
        assert!(f.blobs.contains(&foreign_name).await);
        assert_eq!(f.blobs.delete_attempts(), 0);
    }

    #[tokio::test]
    async fn test_upload_accepts_dot_file_name() {
        let f = fixture();
        let upload = ImageUpload {
            file_name: ".png",
            content_type: "image/png",
            bytes: b"png",
        };

        let url = f.service.upload_image("u1", upload, false, None).await.unwrap();
        assert!(url.ends_with(".png"));
    }

    #[test]
    fn test_file_extension_uses_last_path_component() {
        assert_eq!(file_extension(".png"), ".png");
        assert_eq!(file_extension("dir/Photo.JPG"), ".jpg");
        assert_eq!(file_extension("C:\\pics\\cover.jpeg"), ".jpeg");
        assert_eq!(file_extension("archive.tar.png"), ".png");
        assert_eq!(file_extension("photo"), "");
        assert_eq!(file_extension("dir.png/photo"), "");
    }

    #[test]
    fn test_blob_ownership_requires_issued_name() {
        let name = format!("u1-{}.png", Uuid::new_v4());
        assert!(is_blob_owned_by(&name, "u1"));
        assert!(!is_blob_owned_by(&name, "u2"));
        assert!(!is_blob_owned_by(&name, "u"));
        assert!(!is_blob_owned_by("u1-old.png", "u1"));

        let sanitized = format!("auth0_abc-{}.jpg", Uuid::new_v4());
        assert!(is_blob_owned_by(&sanitized, "auth0|abc"));
    }

    #[test]
    fn test_blob_name_sanitizes_caller_id() {
        assert_eq!(sanitize_for_blob_name("auth0|abc/def"), "auth0_abc_def");
        assert_eq!(sanitize_for_blob_name("u-1_a"), "u-1_a");
    }

    #[test]
    fn test_month_bounds_wraps_december() {
        let (from, to) = month_bounds(2024, 12).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
