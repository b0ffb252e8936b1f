use crate::errors::TrackerError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Day strings are stored the way a US-locale browser prints them: `1/2/2024`.
pub const DAY_FORMAT: &str = "%-m/%-d/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Nil for records written before ids existed, until the repository
    /// assigns and saves one.
    #[serde(default)]
    pub id: Uuid,
    pub description: String,
    pub time: String,
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completion_date: Option<String>,
}

impl Activity {
    pub fn new(description: impl Into<String>, time: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            time: time.into(),
            date: format_day(day),
            completed: false,
            completion_date: None,
        }
    }

    pub fn display_text(&self) -> String {
        format!("{} at {} on {}", self.description, self.time, self.date)
    }

    pub fn is_scheduled_on(&self, day: NaiveDate) -> bool {
        self.date == format_day(day)
    }

    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.completed && self.completion_date.as_deref() == Some(format_day(day).as_str())
    }

    pub fn mark_complete(&mut self, day: NaiveDate) {
        self.completed = true;
        self.completion_date = Some(format_day(day));
    }

    /// Same description and time on `day`, with completion cleared and a new id.
    pub fn carried_to(&self, day: NaiveDate) -> Self {
        Self::new(self.description.clone(), self.time.clone(), day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayState {
    DoneToday,
    Open,
}

impl DisplayState {
    pub fn color(self) -> &'static str {
        match self {
            DisplayState::DoneToday => "green",
            DisplayState::Open => "black",
        }
    }
}

/// What the page renders for one activity. Never written back to the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub display: DisplayState,
    pub color: &'static str,
    pub text: String,
}

impl ActivityView {
    /// A completion recorded on any other day than `today` is stale and the
    /// view reports the activity as not completed.
    pub fn for_day(mut activity: Activity, today: NaiveDate) -> Self {
        let display = if activity.is_done_on(today) {
            DisplayState::DoneToday
        } else {
            activity.completed = false;
            DisplayState::Open
        };
        let text = activity.display_text();
        Self {
            activity,
            display,
            color: display.color(),
            text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub description: String,
    pub time: String,
}

impl NewActivity {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.description.trim().is_empty() {
            return Err(TrackerError::InvalidInput(
                "description must not be empty".into(),
            ));
        }
        parse_time_of_day(&self.time)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityEdit {
    pub description: Option<String>,
    pub time: Option<String>,
}

impl ActivityEdit {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(TrackerError::InvalidInput(
                    "description must not be empty".into(),
                ));
            }
        }
        if let Some(time) = &self.time {
            parse_time_of_day(time)?;
        }
        Ok(())
    }

    pub fn apply(&self, activity: &mut Activity) {
        if let Some(description) = &self.description {
            activity.description = description.trim().to_string();
        }
        if let Some(time) = &self.time {
            activity.time = time.trim().to_string();
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub after: u64,
}

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub permission: crate::channels::Permission,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub activity: ActivityView,
    pub message: String,
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Accepts `H:MM` or `HH:MM` on a 24-hour clock.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TrackerError> {
    let err = || TrackerError::TimeParse(value.to_string());
    let (hour, minute) = value.trim().split_once(':').ok_or_else(err)?;
    let digits = |part: &str, max_len: usize| {
        !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(hour, 2) || minute.len() != 2 || !digits(minute, 2) {
        return Err(err());
    }
    let hour: u32 = hour.parse().map_err(|_| err())?;
    let minute: u32 = minute.parse().map_err(|_| err())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_strings_use_unpadded_us_format() {
        assert_eq!(format_day(day(2024, 1, 2)), "1/2/2024");
        assert_eq!(format_day(day(2024, 11, 30)), "11/30/2024");
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(
            parse_time_of_day("18:00").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("7:05").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
        for bad in ["", "18", "24:00", "12:60", "ab:cd", "12:5", "-1:00", "123:00"] {
            assert!(
                matches!(parse_time_of_day(bad), Err(TrackerError::TimeParse(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn stale_completion_is_reported_open() {
        let mut activity = Activity::new("Read", "08:00", day(2024, 1, 1));
        activity.mark_complete(day(2024, 1, 1));

        let view = ActivityView::for_day(activity.clone(), day(2024, 1, 2));
        assert_eq!(view.display, DisplayState::Open);
        assert!(!view.activity.completed);
        assert_eq!(view.color, "black");

        let same_day = ActivityView::for_day(activity, day(2024, 1, 1));
        assert_eq!(same_day.display, DisplayState::DoneToday);
        assert!(same_day.activity.completed);
        assert_eq!(same_day.color, "green");
    }

    #[test]
    fn legacy_records_without_id_deserialize() {
        let raw = r#"[{"description":"Gym","time":"18:00","date":"1/2/2024","completed":false,"completionDate":null}]"#;
        let list: Vec<Activity> = serde_json::from_str(raw).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].description, "Gym");
        assert!(list[0].id.is_nil());
    }

    #[test]
    fn view_serializes_flat_camel_case() {
        let activity = Activity::new("Gym", "18:00", day(2024, 1, 2));
        let value = serde_json::to_value(ActivityView::for_day(activity, day(2024, 1, 2))).unwrap();
        assert_eq!(value["description"], "Gym");
        assert_eq!(value["completionDate"], serde_json::Value::Null);
        assert_eq!(value["display"], "open");
        assert_eq!(value["text"], "Gym at 18:00 on 1/2/2024");
    }

    #[test]
    fn edit_changes_only_description_and_time() {
        let mut activity = Activity::new("Gym", "18:00", day(2024, 1, 2));
        activity.mark_complete(day(2024, 1, 2));
        let before = activity.clone();
        ActivityEdit {
            description: Some(" Swim ".into()),
            time: None,
        }
        .apply(&mut activity);
        assert_eq!(activity.description, "Swim");
        assert_eq!(activity.time, before.time);
        assert_eq!(activity.date, before.date);
        assert_eq!(activity.completed, before.completed);
        assert_eq!(activity.id, before.id);
    }
}
