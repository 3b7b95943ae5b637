use chrono::{Datelike, Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn first_day_of_next_month(date: NaiveDate) -> NaiveDate {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };

    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };

    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Zero-padded "YYYY-MM" bucket key. Lexicographic order on these keys is
/// chronological order.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// "Feb 26" style axis label used by the debt views.
pub fn short_month_label(date: NaiveDate) -> String {
    format!("{} {:02}", month_abbrev(date.month()), date.year() % 100)
}

pub fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

/// Ratio as a percentage, with a zero denominator reported as 0.0 rather
/// than NaN so downstream rendering stays total.
pub fn safe_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        (part / whole) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2026, 12),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_first_day_of_next_month() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        assert_eq!(
            first_day_of_next_month(date),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );

        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(
            first_day_of_next_month(date),
            NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_month_key_sorts_chronologically() {
        let nov = month_key(NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
        let feb = month_key(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(nov, "2025-11");
        assert_eq!(feb, "2026-02");
        assert!(nov < feb);
    }

    #[test]
    fn test_short_month_label() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(short_month_label(date), "Feb 26");
    }

    #[test]
    fn test_safe_percent_zero_denominator() {
        assert_eq!(safe_percent(50.0, 200.0), 25.0);
        assert_eq!(safe_percent(10.0, 0.0), 0.0);
    }
}
