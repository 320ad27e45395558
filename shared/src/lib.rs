use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day-of-week abbreviation used by recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Three-letter abbreviation, matching `chrono`'s short weekday format.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unrecognized weekday: {0}")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mon" | "monday" => Ok(Self::Mon),
            "tue" | "tuesday" => Ok(Self::Tue),
            "wed" | "wednesday" => Ok(Self::Wed),
            "thu" | "thursday" => Ok(Self::Thu),
            "fri" | "friday" => Ok(Self::Fri),
            "sat" | "saturday" => Ok(Self::Sat),
            "sun" | "sunday" => Ok(Self::Sun),
            other => Err(ParseWeekdayError(other.to_string())),
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

/// Rule determining which calendar days a medication is due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Due every calendar day.
    Daily,
    /// Due only on the listed weekdays.
    OnDays(Vec<Weekday>),
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid recurrence descriptor: {0}")]
pub struct ParseRecurrenceError(pub String);

impl Recurrence {
    /// Whether a medication with this rule is due on the given weekday.
    pub fn is_due_on(&self, day: Weekday) -> bool {
        match self {
            Self::Daily => true,
            Self::OnDays(days) => days.contains(&day),
        }
    }

    /// Render as the storage descriptor: `"Daily"` or a comma-joined
    /// weekday list like `"Mon,Wed"`.
    pub fn descriptor(&self) -> String {
        match self {
            Self::Daily => "Daily".to_string(),
            Self::OnDays(days) => days
                .iter()
                .map(Weekday::abbrev)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl FromStr for Recurrence {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("daily") {
            return Ok(Self::Daily);
        }
        let days = trimmed
            .split(',')
            .map(Weekday::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseRecurrenceError(s.to_string()))?;
        if days.is_empty() {
            return Err(ParseRecurrenceError(s.to_string()));
        }
        Ok(Self::OnDays(days))
    }
}

/// A single recurring medication belonging to one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    /// ID of the patient this medication belongs to
    pub patient_id: i64,
    pub name: String,
    /// Dosage text shown to the caregiver (e.g. "500mg")
    pub dosage: String,
    /// Free-text intake instructions (e.g. "Before food")
    pub instructions: String,
    /// Scheduled time of day, fixed-width zero-padded "HH:MM"
    pub schedule_time: String,
    pub recurrence: Recurrence,
    /// Doses remaining in the dispenser
    pub stock: i64,
    /// Full-refill quantity, set at creation; stock never exceeds this
    pub max_stock: i64,
    /// Date the dose was most recently marked taken, if any
    pub last_taken: Option<NaiveDate>,
}

/// Field values for a medication that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedication {
    pub patient_id: i64,
    pub name: String,
    pub dosage: String,
    pub instructions: String,
    pub schedule_time: String,
    pub recurrence: Recurrence,
    pub stock: i64,
    pub max_stock: i64,
}

/// A medication joined with the name of its owning patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationWithPatient {
    pub medication: Medication,
    pub patient_name: String,
}

/// A patient cared for under one caregiver account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    /// Opaque caregiver account ID supplied by the serving layer
    pub account_id: i64,
    pub name: String,
}

/// Display status of a dose scheduled for today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    /// Already marked taken today
    Completed,
    /// Scheduled time is still ahead of now
    Upcoming,
    /// Scheduled time has passed (or is exactly now) and not yet taken
    Pending,
}

/// One row of the due-today schedule view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Medication ID, needed for toggling and deleting
    pub id: i64,
    /// Scheduled time of day, "HH:MM"
    pub time: String,
    /// Medication name
    pub task: String,
    /// Name of the patient the dose belongs to
    pub patient: String,
    pub status: ScheduleStatus,
    pub is_done: bool,
}

/// Inventory health derived from remaining stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryStatus {
    Ok,
    Low,
}

/// One row of the inventory view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Medication name with owning patient, e.g. "Metformin (Grandma)"
    pub name: String,
    pub dosage: String,
    pub stock: i64,
    /// Display total: the full-refill quantity
    pub total: i64,
    pub unit: String,
    pub status: InventoryStatus,
    pub instructions: String,
}

/// Today's adherence roll-up over all of an account's medications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceStats {
    pub total: i64,
    pub taken: i64,
    pub missed: i64,
    /// Percentage of medications taken today, truncated toward zero
    pub score: i64,
}

/// An immutable activity trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub account_id: i64,
    /// Action label, e.g. "Dispensed Metformin"
    pub action: String,
    pub detail: String,
    /// RFC 3339 creation timestamp
    pub timestamp: String,
}

/// Field values for an activity entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityEntry {
    pub account_id: i64,
    pub action: String,
    pub detail: String,
    pub timestamp: String,
}

/// Request to create a single medication reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMedicationRequest {
    pub account_id: i64,
    /// Target patient; defaults to the account's first patient when absent
    pub patient_id: Option<i64>,
    pub name: String,
    pub dosage: Option<String>,
    /// Scheduled time of day, "HH:MM"
    pub time: String,
    pub instructions: Option<String>,
    /// Defaults to daily when absent
    pub recurrence: Option<Recurrence>,
}

/// Response after creating a medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationResponse {
    pub medication: Medication,
    pub success_message: String,
}

/// Request to delete a medication by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMedicationRequest {
    pub id: i64,
}

/// Request to toggle a dose between untaken-today and taken-today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleDoseRequest {
    pub id: i64,
    pub account_id: i64,
}

/// Response after a successful dose toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleDoseResponse {
    pub medication_id: i64,
    pub name: String,
    /// Stock remaining after the transition
    pub stock: i64,
    /// Whether the medication is now marked taken for today
    pub taken_today: bool,
    pub success_message: String,
}

/// Kind of manual request raised from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Medicine,
    Water,
    Help,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medicine => write!(f, "Medicine"),
            Self::Water => write!(f, "Water"),
            Self::Help => write!(f, "Help"),
        }
    }
}

/// Request to record a manual or emergency event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRequestRequest {
    pub account_id: i64,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub note: Option<String>,
}

/// Response after recording a manual or emergency event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRequestResponse {
    pub success_message: String,
}

/// One medication row of the initial-setup roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupMedication {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
    /// Scheduled time of day, "HH:MM"
    pub time: String,
    pub recurrence: Recurrence,
    /// Initial stock; also used as the full-refill quantity
    pub stock: i64,
}

/// One patient of the initial-setup roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupPatient {
    pub name: String,
    pub meds: Vec<SetupMedication>,
}

/// Request to replace an account's entire patient/medication roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRequest {
    pub account_id: i64,
    pub patients: Vec<SetupPatient>,
}

/// Response after a roster replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupResponse {
    pub patients_created: usize,
    pub medications_created: usize,
    pub success_message: String,
}

/// Validation failures rejected before any store write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Patient name cannot be empty")]
    EmptyPatientName,
    #[error("Medication name cannot be empty")]
    EmptyMedicationName,
    #[error("Medication name cannot exceed 100 characters")]
    MedicationNameTooLong,
    #[error("Scheduled time must be in zero-padded HH:MM format: {0}")]
    InvalidTime(String),
    #[error("Weekday recurrence must list at least one day")]
    EmptyDaySet,
    #[error("Stock cannot be negative")]
    NegativeStock,
}
