//! Poll availability.

use chrono::{DateTime, Utc};
use pollapi_db::entities::poll;

/// Whether `poll` accepts answers at `now`.
///
/// Both window bounds are exclusive. Callers pass a fresh `now` on every
/// read and submission; the result is never cached.
#[must_use]
pub fn is_active(poll: &poll::Model, now: DateTime<Utc>) -> bool {
    poll.is_ready && poll.start_date < now && now < poll.end_date
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn window_poll(is_ready: bool) -> poll::Model {
        poll::Model {
            id: 1,
            name: "Window".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap().into(),
            description: String::new(),
            is_ready,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_active_inside_window() {
        assert!(is_active(&window_poll(true), start() + Duration::days(10)));
    }

    #[test]
    fn test_not_ready_is_never_active() {
        assert!(!is_active(&window_poll(false), start() + Duration::days(10)));
    }

    #[test]
    fn test_start_boundary_is_exclusive() {
        let poll = window_poll(true);
        assert!(!is_active(&poll, start() - Duration::seconds(1)));
        assert!(!is_active(&poll, start()));
        assert!(is_active(&poll, start() + Duration::seconds(1)));
    }

    #[test]
    fn test_end_boundary_is_exclusive() {
        let poll = window_poll(true);
        assert!(is_active(&poll, end() - Duration::seconds(1)));
        assert!(!is_active(&poll, end()));
        assert!(!is_active(&poll, end() + Duration::seconds(1)));
    }

    #[test]
    fn test_offset_timestamps_compare_by_instant() {
        let mut poll = window_poll(true);
        let plus_five = chrono::FixedOffset::east_opt(5 * 3600).unwrap();
        poll.start_date = start().with_timezone(&plus_five);
        assert!(!is_active(&poll, start()));
        assert!(is_active(&poll, start() + Duration::milliseconds(1)));
    }
}
