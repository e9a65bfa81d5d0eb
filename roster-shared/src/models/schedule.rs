/// Typed view of the weekly schedule document
///
/// Rosters are stored as opaque JSON, so nothing here is enforced on write.
/// These types are used to read a single day back out, to hand the editor a
/// blank week to start from, and for the best-effort checks the editor runs
/// before saving.
///
/// ```json
/// {
///   "monday": {
///     "morning": [{"name": "Jane"}, {"name": "Sam"}],
///     "evening": [{"name": "Alex"}],
///     "instructions": "Bins out"
///   }
/// }
/// ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Day of the week, keyed in lowercase in the roster JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday first, the order the editor shows days in
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Key used in the roster JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two daily shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Evening,
}

impl Shift {
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Evening => "evening",
        }
    }
}

/// A named carer slot on a shift
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarerSlot {
    #[serde(default)]
    pub name: String,
}

impl CarerSlot {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Everything scheduled for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub morning: Vec<CarerSlot>,

    #[serde(default)]
    pub evening: Vec<CarerSlot>,

    #[serde(default)]
    pub instructions: String,
}

impl DaySchedule {
    /// Two empty slots per shift and no instructions
    pub fn blank() -> Self {
        Self {
            morning: vec![CarerSlot::default(), CarerSlot::default()],
            evening: vec![CarerSlot::default(), CarerSlot::default()],
            instructions: String::new(),
        }
    }

    pub fn shift(&self, shift: Shift) -> &[CarerSlot] {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Evening => &self.evening,
        }
    }
}

/// Whole-week schedule keyed by day
pub type WeekSchedule = BTreeMap<Weekday, DaySchedule>;

/// Which days are included in a roster
pub type ActiveDays = BTreeMap<Weekday, bool>;

/// The editor's starting point: every day blank
pub fn blank_week() -> WeekSchedule {
    Weekday::ALL
        .iter()
        .map(|day| (*day, DaySchedule::blank()))
        .collect()
}

/// The editor's starting point: every day active
pub fn all_days_active() -> ActiveDays {
    Weekday::ALL.iter().map(|day| (*day, true)).collect()
}

/// Truthiness as the browser client sees it
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether `day` is flagged active in an `activeDays` document
pub fn is_day_active(active_days: &Value, day: Weekday) -> bool {
    active_days.get(day.as_str()).map(is_truthy).unwrap_or(false)
}

/// Pulls one day out of a roster document
///
/// Returns `None` if the day is absent or not shaped like a day schedule.
pub fn day_schedule(data: &Value, day: Weekday) -> Option<DaySchedule> {
    let value = data.get(day.as_str())?;
    serde_json::from_value(value.clone()).ok()
}

/// Best-effort checks run before a roster is saved
///
/// Only active days are inspected. An empty result means no problems were
/// found; saving is never blocked by this on the server.
pub fn validate_week(data: &Value, active_days: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    for day in Weekday::ALL {
        if !is_day_active(active_days, day) {
            continue;
        }

        let shifts = data.get(day.as_str()).and_then(|day_data| {
            let morning = day_data.get("morning")?.as_array()?;
            let evening = day_data.get("evening")?.as_array()?;
            Some([(Shift::Morning, morning), (Shift::Evening, evening)])
        });

        let Some(shifts) = shifts else {
            errors.push(format!("{} is missing required shift data", day));
            continue;
        };

        for (shift, carers) in &shifts {
            let has_empty_name = carers.iter().any(|carer| {
                carer
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|name| name.trim().is_empty())
                    .unwrap_or(true)
            });
            if has_empty_name {
                errors.push(format!("{} {} shift has empty carer names", day, shift.as_str()));
            }
        }

        for (shift, carers) in &shifts {
            if carers.is_empty() {
                errors.push(format!(
                    "{} {} shift needs at least one carer",
                    day,
                    shift.as_str()
                ));
            }
        }
    }

    errors
}
