use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub consent_status: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    #[serde(default)]
    pub consent_status: bool,
}

impl NewPatient {
    /// Names and date of birth must not be blank. The date of birth is
    /// otherwise stored as given.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("dob", &self.dob),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MedicalRecord {
    pub id: i32,
    pub patient_id: i32,
    pub record_type: String, // FHIR, OCR, ...
    pub record_content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicalRecord {
    pub record_type: String,
    pub record_content: String,
}

impl NewMedicalRecord {
    pub fn validate(&self) -> Result<(), String> {
        if self.record_type.trim().is_empty() {
            return Err("record_type must not be empty".to_string());
        }
        if self.record_content.trim().is_empty() {
            return Err("record_content must not be empty".to_string());
        }
        Ok(())
    }
}
