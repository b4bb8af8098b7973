pub mod attendee;
pub mod event;

pub use attendee::Attendee;
pub use event::{
    Event, EventChanges, EventDraft, EventRequest, EventResponse, MonthQuery, NewEvent,
    UploadImageResponse,
};
