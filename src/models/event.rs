use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Persisted event row, joined with the number of attendee rows that
/// reference it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub owner_id: String,
    pub image_url: Option<String>,
    pub attendee_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new event row. The id is assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub owner_id: String,
    pub title: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub image_url: Option<String>,
}

/// Full replacement of the mutable event columns.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub title: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub image_url: Option<String>,
}

/// Body of `POST /events` and `PUT /events/{id}`.
///
/// Every field is optional at the JSON level so that missing values are
/// reported through [`EventRequest::validate`] with a readable message
/// instead of a deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub image_url: Option<String>,
}

/// An [`EventRequest`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    /// `None` when the request omitted the image or sent an empty string.
    pub image_url: Option<String>,
}

impl EventRequest {
    pub fn validate(self) -> AppResult<EventDraft> {
        let title = required_text(self.title, "title")?;
        let location = required_text(self.location, "location")?;

        let start_date = match self.start_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_start_date(raw).ok_or_else(|| {
                AppError::ValidationError(format!("startDate '{}' is not a valid date", raw))
            })?,
            _ => {
                return Err(AppError::ValidationError(
                    "startDate is required".to_string(),
                ))
            }
        };

        let image_url = match self.image_url.map(|u| u.trim().to_string()) {
            Some(url) if !url.is_empty() => {
                if !is_absolute_http_url(&url) {
                    return Err(AppError::ValidationError(format!(
                        "imageUrl '{}' is not a valid URL",
                        url
                    )));
                }
                Some(url)
            }
            _ => None,
        };

        Ok(EventDraft {
            title,
            location,
            start_date,
            image_url,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::ValidationError(format!("{} is required", field))),
    }
}

fn is_absolute_http_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Accepts RFC 3339 timestamps, offset-less timestamps (taken as UTC) and
/// bare dates (midnight UTC).
pub fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Read-facing shape of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub owner_id: String,
    pub attendee_count: i64,
    pub image_url: Option<String>,
}

impl From<Event> for EventResponse {
    fn from(value: Event) -> Self {
        let Event {
            id,
            title,
            location,
            start_date,
            owner_id,
            image_url,
            attendee_count,
            ..
        } = value;
        EventResponse {
            id,
            title,
            location,
            start_date,
            owner_id,
            attendee_count,
            image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, location: &str, start: &str, image: Option<&str>) -> EventRequest {
        EventRequest {
            title: Some(title.to_string()),
            location: Some(location.to_string()),
            start_date: Some(start.to_string()),
            image_url: image.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        let draft = request(
            "Meetup",
            "Online",
            "2024-06-01T18:30:00Z",
            Some("https://cdn.example.com/a.png"),
        )
        .validate()
        .unwrap();

        assert_eq!(draft.title, "Meetup");
        assert_eq!(draft.location, "Online");
        assert_eq!(
            draft.start_date,
            Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap()
        );
        assert_eq!(
            draft.image_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let err = request("   ", "Online", "2024-06-01", None)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("title")));
    }

    #[test]
    fn test_validate_rejects_missing_start_date() {
        let mut req = request("Meetup", "Online", "", None);
        req.start_date = None;
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_malformed_image_url() {
        let err = request("Meetup", "Online", "2024-06-01", Some("not a url"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("imageUrl")));

        let err = request("Meetup", "Online", "2024-06-01", Some("ftp://host/a.png"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_empty_image_url_means_unset() {
        let draft = request("Meetup", "Online", "2024-06-01", Some(""))
            .validate()
            .unwrap();
        assert_eq!(draft.image_url, None);
    }

    #[test]
    fn test_parse_start_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_start_date("2024-06-01"), Some(midnight));
        assert_eq!(parse_start_date("2024-06-01T00:00:00"), Some(midnight));
        assert_eq!(parse_start_date("2024-06-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_start_date("June 1st"), None);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let event = Event {
            id: Uuid::nil(),
            title: "Meetup".into(),
            location: "Online".into(),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            owner_id: "u1".into(),
            image_url: None,
            attendee_count: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(EventResponse::from(event)).unwrap();
        assert_eq!(json["ownerId"], "u1");
        assert_eq!(json["attendeeCount"], 2);
        assert!(json["imageUrl"].is_null());
        assert!(json.get("createdAt").is_none());
    }
}
