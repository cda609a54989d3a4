use chrono::NaiveTime;

use crate::compute::deductions::round2;
use crate::model::status::AttendanceStatus;

pub const WORK_HOURS_PER_DAY: i64 = 8;
pub const MINUTES_PER_HOUR: i64 = 60;
pub const MINUTES_PER_DAY: i64 = WORK_HOURS_PER_DAY * MINUTES_PER_HOUR;

/// Hours above which the fixed one-hour lunch break is deducted.
const LUNCH_DEDUCTION_THRESHOLD_HOURS: f64 = 4.0;

pub fn shift_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

pub fn shift_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap()
}

/// Worked hours for one attendance day.
///
/// Both punches are clamped to the 08:00-17:00 shift window; a span of zero or
/// less (or an Absent tag, or a missing punch) yields 0. Spans longer than
/// four hours lose the one-hour lunch break.
pub fn working_hours(
    status: AttendanceStatus,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
) -> f64 {
    if status == AttendanceStatus::Absent {
        return 0.0;
    }
    let (time_in, time_out) = match (time_in, time_out) {
        (Some(i), Some(o)) => (i, o),
        _ => return 0.0,
    };

    let start = time_in.max(shift_start());
    let end = time_out.min(shift_end());
    if end <= start {
        return 0.0;
    }

    let total_hours = (end - start).num_minutes() as f64 / 60.0;
    if total_hours > LUNCH_DEDUCTION_THRESHOLD_HOURS {
        round2(total_hours - 1.0)
    } else {
        round2(total_hours)
    }
}

/// Minutes late relative to the 08:00 shift start; zero when on time.
pub fn lateness_minutes(time_in: NaiveTime) -> i64 {
    let start = shift_start();
    if time_in > start {
        (time_in - start).num_minutes()
    } else {
        0
    }
}

/// Minutes of undertime relative to the 17:00 shift end; zero when the
/// employee stayed through the end of shift.
pub fn undertime_minutes(time_out: NaiveTime) -> i64 {
    let end = shift_end();
    if time_out < end {
        (end - time_out).num_minutes()
    } else {
        0
    }
}

/// Break a minute count into an (hours, minutes) pair for display.
pub fn split_minutes(minutes: i64) -> (i64, i64) {
    (minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR)
}

/// Status tag derived from the morning punch: strictly after 08:00 is Late.
pub fn classify_time_in(time_in: NaiveTime) -> AttendanceStatus {
    if time_in > shift_start() {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Worked hours expressed as a fraction of the 8-hour day, rounded to six
/// places (CSC-style day-fraction reporting).
pub fn hours_to_day_fraction(hours: f64) -> f64 {
    ((hours / WORK_HOURS_PER_DAY as f64) * 1_000_000.0).round() / 1_000_000.0
}

pub fn minutes_to_day_fraction(minutes: i64) -> f64 {
    ((minutes as f64 / MINUTES_PER_DAY as f64) * 1_000_000.0).round() / 1_000_000.0
}

pub fn is_full_day(hours: i64, minutes: i64) -> bool {
    hours * MINUTES_PER_HOUR + minutes >= MINUTES_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn late_arrival_with_overtime_punch_out() {
        // 09:15 in, 17:30 out: clamp to 09:15-17:00 = 7h45m, minus lunch
        let hours = working_hours(AttendanceStatus::Present, Some(t(9, 15)), Some(t(17, 30)));
        assert_eq!(hours, 6.75);
        assert_eq!(lateness_minutes(t(9, 15)), 75);
        assert_eq!(undertime_minutes(t(17, 30)), 0);
    }

    #[test]
    fn full_day_is_eight_hours() {
        let hours = working_hours(AttendanceStatus::Present, Some(t(8, 0)), Some(t(17, 0)));
        assert_eq!(hours, 8.0);
    }

    #[test]
    fn early_punches_are_clamped() {
        // 06:30 in counts from 08:00; 18:00 out counts to 17:00
        let hours = working_hours(AttendanceStatus::Present, Some(t(6, 30)), Some(t(18, 0)));
        assert_eq!(hours, 8.0);
        assert_eq!(lateness_minutes(t(6, 30)), 0);
    }

    #[test]
    fn short_span_skips_lunch_deduction() {
        // 08:00-11:30 is 3.5h, at or below the 4h threshold
        let hours = working_hours(AttendanceStatus::Present, Some(t(8, 0)), Some(t(11, 30)));
        assert_eq!(hours, 3.5);
        // exactly 4h keeps the raw span
        let hours = working_hours(AttendanceStatus::Present, Some(t(8, 0)), Some(t(12, 0)));
        assert_eq!(hours, 4.0);
        // 4h01m crosses the threshold and loses the lunch hour
        let hours = working_hours(AttendanceStatus::Present, Some(t(8, 0)), Some(t(12, 1)));
        assert_eq!(hours, 3.02);
    }

    #[test]
    fn absent_or_missing_punch_is_zero() {
        assert_eq!(
            working_hours(AttendanceStatus::Absent, Some(t(8, 0)), Some(t(17, 0))),
            0.0
        );
        assert_eq!(working_hours(AttendanceStatus::Present, Some(t(8, 0)), None), 0.0);
        assert_eq!(working_hours(AttendanceStatus::Present, None, Some(t(17, 0))), 0.0);
    }

    #[test]
    fn inverted_span_is_zero() {
        assert_eq!(
            working_hours(AttendanceStatus::Present, Some(t(16, 0)), Some(t(9, 0))),
            0.0
        );
        // out before shift start clamps to an empty span
        assert_eq!(
            working_hours(AttendanceStatus::Present, Some(t(6, 0)), Some(t(7, 0))),
            0.0
        );
    }

    #[test]
    fn undertime_only_before_shift_end() {
        assert_eq!(undertime_minutes(t(16, 30)), 30);
        assert_eq!(undertime_minutes(t(17, 0)), 0);
    }

    #[test]
    fn classify_marks_late_strictly_after_eight() {
        assert_eq!(classify_time_in(t(8, 0)), AttendanceStatus::Present);
        assert_eq!(classify_time_in(t(8, 1)), AttendanceStatus::Late);
    }

    #[test]
    fn day_fraction_helpers() {
        assert_eq!(hours_to_day_fraction(6.75), 0.84375);
        assert_eq!(minutes_to_day_fraction(240), 0.5);
        assert_eq!(split_minutes(75), (1, 15));
        assert!(is_full_day(8, 0));
        assert!(!is_full_day(7, 59));
    }
}
