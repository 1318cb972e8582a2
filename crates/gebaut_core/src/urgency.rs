//! Urgency classification from due-date proximity.
//!
//! A due date counts from midnight UTC of that day. The remaining time is
//! rounded up to whole days, so anything due within the next 24 hours is one
//! day away and anything already past is zero or negative.

use crate::model::UrgencyLevel;
use time::{Date, OffsetDateTime};

const NANOS_PER_DAY: i128 = 86_400 * 1_000_000_000;

pub const VERY_URGENT_BELOW_DAYS: i64 = 3;
pub const MEDIUM_URGENT_MAX_DAYS: i64 = 7;

pub fn classify_urgency(due_date: Option<Date>, now: OffsetDateTime) -> UrgencyLevel {
    let Some(due_date) = due_date else {
        return UrgencyLevel::MediumUrgent;
    };

    let days = days_remaining(due_date, now);
    if days < VERY_URGENT_BELOW_DAYS {
        UrgencyLevel::VeryUrgent
    } else if days <= MEDIUM_URGENT_MAX_DAYS {
        UrgencyLevel::MediumUrgent
    } else {
        UrgencyLevel::NotUrgent
    }
}

/// Whole days until `due_date`, rounded towards positive infinity.
pub fn days_remaining(due_date: Date, now: OffsetDateTime) -> i64 {
    let due = due_date.midnight().assume_utc();
    let nanos = (due - now).whole_nanoseconds();

    let mut days = nanos.div_euclid(NANOS_PER_DAY);
    if nanos.rem_euclid(NANOS_PER_DAY) != 0 {
        days += 1;
    }

    days as i64
}

#[cfg(test)]
mod tests {
    use super::{classify_urgency, days_remaining};
    use crate::model::UrgencyLevel;
    use rstest::rstest;
    use time::macros::{date, datetime};
    use time::{Date, Duration, OffsetDateTime};

    #[rstest]
    #[case::overdue(date!(2026 - 10 - 10), UrgencyLevel::VeryUrgent)]
    #[case::today(date!(2026 - 10 - 18), UrgencyLevel::VeryUrgent)]
    #[case::two_days(date!(2026 - 10 - 20), UrgencyLevel::VeryUrgent)]
    #[case::three_days(date!(2026 - 10 - 21), UrgencyLevel::MediumUrgent)]
    #[case::seven_days(date!(2026 - 10 - 25), UrgencyLevel::MediumUrgent)]
    #[case::eight_days(date!(2026 - 10 - 26), UrgencyLevel::NotUrgent)]
    #[case::next_month(date!(2026 - 11 - 30), UrgencyLevel::NotUrgent)]
    fn classifies_by_days_remaining(#[case] due: Date, #[case] expected: UrgencyLevel) {
        let now = datetime!(2026-10-18 12:00 UTC);
        assert_eq!(classify_urgency(Some(due), now), expected);
    }

    #[test]
    fn missing_due_date_is_medium_urgent() {
        let now = datetime!(2026-10-18 12:00 UTC);
        assert_eq!(classify_urgency(None, now), UrgencyLevel::MediumUrgent);
    }

    #[rstest]
    #[case::one_day(1, UrgencyLevel::VeryUrgent)]
    #[case::five_days(5, UrgencyLevel::MediumUrgent)]
    #[case::thirty_days(30, UrgencyLevel::NotUrgent)]
    fn classifies_relative_to_current_time(#[case] days: i64, #[case] expected: UrgencyLevel) {
        let now = OffsetDateTime::now_utc();
        let due = (now + Duration::days(days)).date();
        assert_eq!(classify_urgency(Some(due), now), expected);
    }

    #[test]
    fn days_remaining_rounds_partial_days_up() {
        let due = date!(2026 - 10 - 21);

        assert_eq!(days_remaining(due, datetime!(2026-10-18 00:00 UTC)), 3);
        assert_eq!(days_remaining(due, datetime!(2026-10-18 00:00:01 UTC)), 3);
        assert_eq!(days_remaining(due, datetime!(2026-10-18 23:59 UTC)), 3);
        assert_eq!(days_remaining(due, datetime!(2026-10-21 00:00 UTC)), 0);
        assert_eq!(days_remaining(due, datetime!(2026-10-21 12:00 UTC)), 0);
        assert_eq!(days_remaining(due, datetime!(2026-10-22 12:00 UTC)), -1);
    }
}
