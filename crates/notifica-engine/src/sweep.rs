//! Time-driven meeting completion. Any scheduled meeting whose date+time
//! has passed becomes completed; the transition is one-directional and
//! idempotent, so re-running the sweep is always safe.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use notifica_core::entities::MeetingStatus;
use notifica_core::storage::MeetingStore;

/// Marks every scheduled meeting past its date+time as completed and
/// returns their ids. Malformed time values skip the meeting rather than
/// abort the sweep.
pub async fn sweep_due_meetings(
    meetings: &dyn MeetingStore,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<Uuid>> {
    let scheduled = meetings.list_by_status(MeetingStatus::Scheduled).await?;
    let mut completed = Vec::new();

    for mut meeting in scheduled {
        let Some(time) = parse_meeting_time(&meeting.scheduled_time) else {
            warn!(
                "meeting {} has malformed time {:?}, skipping",
                meeting.id, meeting.scheduled_time
            );
            continue;
        };
        let due_at = meeting.scheduled_date.and_time(time).and_utc();
        if due_at > now {
            continue;
        }

        meeting.status = MeetingStatus::Completed;
        let meeting_id = meeting.id;
        if let Err(err) = meetings.put(meeting).await {
            warn!("failed to complete meeting {meeting_id}: {err:#}");
            continue;
        }
        completed.push(meeting_id);
    }

    Ok(completed)
}

fn parse_meeting_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_time_parsing() {
        assert!(parse_meeting_time("14:30").is_some());
        assert!(parse_meeting_time(" 09:05:30 ").is_some());
        assert!(parse_meeting_time("2pm").is_none());
        assert!(parse_meeting_time("").is_none());
    }
}
