//! Weekly opening hours. Times are UTC; weekday 1 is Monday.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use uuid::Uuid;
use zapeat_proto::restaurant_service as proto;

use crate::error::FieldViolation;
use crate::models::OpeningTime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyHours {
    pub weekday: i16,
    pub from_hour: NaiveTime,
    pub to_hour: NaiveTime,
}

impl WeeklyHours {
    pub fn for_restaurant(&self, restaurant_id: Uuid) -> OpeningTime {
        OpeningTime {
            id: Uuid::new_v4(),
            restaurant_id,
            weekday: self.weekday,
            from_hour: self.from_hour,
            to_hour: self.to_hour,
        }
    }
}

pub fn parse_opening_times(
    times: &[proto::OpeningTime],
) -> Result<Vec<WeeklyHours>, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut hours = Vec::with_capacity(times.len());
    for (index, time) in times.iter().enumerate() {
        let field = |name: &str| format!("opening_times[{index}].{name}");
        let weekday = match i16::try_from(time.weekday) {
            Ok(weekday @ 1..=7) => Some(weekday),
            _ => {
                violations.push(FieldViolation::new(
                    field("weekday"),
                    format!("{} is not a valid weekday", time.weekday),
                ));
                None
            }
        };
        let from_hour = parse_hour(&time.from_hour)
            .map_err(|description| violations.push(FieldViolation::new(field("from_hour"), description)))
            .ok();
        let to_hour = parse_hour(&time.to_hour)
            .map_err(|description| violations.push(FieldViolation::new(field("to_hour"), description)))
            .ok();

        let (Some(weekday), Some(from_hour), Some(to_hour)) = (weekday, from_hour, to_hour) else {
            continue;
        };
        if from_hour > to_hour {
            violations.push(FieldViolation::new(
                field("to_hour"),
                "Closing time must not be before opening time",
            ));
            continue;
        }
        hours.push(WeeklyHours {
            weekday,
            from_hour,
            to_hour,
        });
    }
    if violations.is_empty() {
        Ok(hours)
    } else {
        Err(violations)
    }
}

fn parse_hour(value: &str) -> Result<NaiveTime, &'static str> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| "Time has wrong format. Use hh:mm or hh:mm:ss")
}

/// Both ends of a slot are inclusive.
pub fn is_open(times: &[OpeningTime], at: DateTime<Utc>) -> bool {
    let weekday = at.weekday().number_from_monday() as i16;
    let time = at.time();
    times
        .iter()
        .any(|t| t.weekday == weekday && t.from_hour <= time && time <= t.to_hour)
}

pub fn serialize_opening_time(time: &OpeningTime) -> proto::OpeningTime {
    proto::OpeningTime {
        weekday: time.weekday.into(),
        from_hour: time.from_hour.format("%H:%M:%S").to_string(),
        to_hour: time.to_hour.format("%H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn slot(weekday: i32, from_hour: &str, to_hour: &str) -> proto::OpeningTime {
        proto::OpeningTime {
            weekday,
            from_hour: from_hour.to_string(),
            to_hour: to_hour.to_string(),
        }
    }

    fn stored(weekday: i16, from_hour: &str, to_hour: &str) -> OpeningTime {
        parse_opening_times(&[slot(weekday.into(), from_hour, to_hour)]).unwrap()[0]
            .for_restaurant(Uuid::new_v4())
    }

    #[test]
    fn hours_accept_minutes_or_seconds() {
        let hours = parse_opening_times(&[slot(1, "09:00", "22:30:15")]).unwrap();
        assert_eq!(hours[0].weekday, 1);
        assert_eq!(hours[0].from_hour, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(hours[0].to_hour, NaiveTime::from_hms_opt(22, 30, 15).unwrap());
    }

    #[test]
    fn every_bad_slot_is_reported() {
        let violations = parse_opening_times(&[
            slot(0, "09:00", "17:00"),
            slot(3, "9am", "17:00"),
            slot(5, "18:00", "08:00"),
        ])
        .unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "opening_times[0].weekday",
                "opening_times[1].from_hour",
                "opening_times[2].to_hour",
            ]
        );
    }

    #[test]
    fn open_only_inside_a_slot_for_the_day() {
        let times = [stored(1, "09:00", "17:00"), stored(3, "11:00", "15:00")];
        // 2025-01-06 is a Monday.
        let monday = |h, m| Utc.with_ymd_and_hms(2025, 1, 6, h, m, 0).unwrap();
        assert!(is_open(&times, monday(9, 0)));
        assert!(is_open(&times, monday(17, 0)));
        assert!(!is_open(&times, monday(8, 59)));
        assert!(!is_open(&times, monday(17, 1)));
        let tuesday_noon = Utc.with_ymd_and_hms(2025, 1, 7, 12, 0, 0).unwrap();
        assert!(!is_open(&times, tuesday_noon));
        assert!(!is_open(&[], monday(12, 0)));
    }

    #[test]
    fn serialized_hours_include_seconds() {
        let time = serialize_opening_time(&stored(7, "10:00", "23:59"));
        assert_eq!(time.weekday, 7);
        assert_eq!(time.from_hour, "10:00:00");
        assert_eq!(time.to_hour, "23:59:00");
    }
}
