use serde::Serialize;

/// One row of the hardcoded FHIR history shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct FhirRow {
    #[serde(rename = "Date")]
    pub date: &'static str,
    #[serde(rename = "Diagnosis")]
    pub diagnosis: &'static str,
    #[serde(rename = "Medication")]
    pub medication: &'static str,
}

#[derive(Debug, Clone)]
pub struct SampleUser {
    pub name: &'static str,
    pub email: &'static str,
    pub dob: &'static str,
    pub data_sharing: &'static str,
    pub earnings: f64,
    pub fhir_data: &'static [FhirRow],
}

pub const SAMPLE_USER: SampleUser = SampleUser {
    name: "John Doe",
    email: "johndoe@example.com",
    dob: "1990-01-01",
    data_sharing: "Research Only",
    earnings: 15.25,
    fhir_data: &[
        FhirRow {
            date: "2025-02-01",
            diagnosis: "Hypertension",
            medication: "Lisinopril",
        },
        FhirRow {
            date: "2025-01-15",
            diagnosis: "Diabetes",
            medication: "Metformin",
        },
    ],
};

pub const SHARING_PREFERENCES: [&str; 3] = ["None", "Research Only (5%)", "Research + Ads (15%)"];

pub const ACCEPTED_UPLOAD_EXTENSIONS: [&str; 3] = ["pdf", "jpg", "png"];

pub const UPLOAD_OCR_TEXT: &str = "Example Medical Report Data";
pub const DEMO_OCR_TEXT: &str = "Example OCR Output";

pub const MOCK_INSIGHTS: [&str; 2] = [
    "High risk for hypertension complications.",
    "Suggests monitoring blood glucose weekly.",
];

pub fn format_earnings(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Falls back to "None" for anything that is not one of the offered choices.
pub fn known_preference(raw: Option<&str>) -> &'static str {
    raw.and_then(|p| SHARING_PREFERENCES.iter().find(|known| **known == p))
        .copied()
        .unwrap_or(SHARING_PREFERENCES[0])
}

pub fn has_accepted_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ACCEPTED_UPLOAD_EXTENSIONS
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}
