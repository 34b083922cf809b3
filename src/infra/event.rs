use std::fs;
use std::path::Path;

use crate::domain::trigger::EventPayload;
use crate::error::{AppError, AppResult};

/// Reads the webhook payload of the triggering event. Runs outside CI have no
/// payload file and get an empty payload.
pub fn load_event_payload(path: Option<&Path>) -> AppResult<EventPayload> {
    let Some(path) = path else {
        return Ok(EventPayload::default());
    };
    let contents = fs::read_to_string(path).map_err(|err| {
        AppError::Resolution(format!(
            "failed to read event payload {}: {err}",
            path.display()
        ))
    })?;
    EventPayload::from_json(&contents)
}
