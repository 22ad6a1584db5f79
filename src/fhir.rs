use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::{info, warn};

/// Raw upstream answer: status code and body text, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FhirResponse {
    pub status: u16,
    pub body: String,
}

impl FhirResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("Invalid FHIR base URL '{0}'")]
    BaseUrl(String),
    #[error("Invalid patient id '{0}'")]
    InvalidPatientId(String),
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FhirError {
    fn from(e: reqwest::Error) -> Self {
        FhirError::Transport(e.to_string())
    }
}

#[async_trait]
pub trait FhirClient: Send + Sync {
    /// Reads `Patient/<patient_id>` from the FHIR server.
    async fn fetch_patient(&self, patient_id: &str) -> Result<FhirResponse, FhirError>;
}

/// Client for an Epic-style FHIR R4 endpoint authenticated by a static
/// bearer token.
pub struct EpicFhirClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl EpicFhirClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, FhirError> {
        let base_url = Url::parse(base_url).map_err(|_| FhirError::BaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FhirError::BaseUrl(base_url.to_string()));
        }
        Ok(EpicFhirClient {
            client: Client::new(),
            base_url,
            access_token: access_token.to_string(),
        })
    }

    /// `<base>/Patient/<patient_id>` with the id as one encoded segment.
    pub fn patient_url(&self, patient_id: &str) -> Result<Url, FhirError> {
        validate_patient_id(patient_id)?;
        let mut url = self.base_url.clone();
        // checked in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("Patient").push(patient_id);
        }
        Ok(url)
    }
}

/// Rejects ids that cannot name a single `Patient/<id>` resource. `push`
/// drops `.` and `..` segments, which would turn the read into a search on
/// `<base>/Patient`.
pub fn validate_patient_id(patient_id: &str) -> Result<(), FhirError> {
    match patient_id.trim() {
        "" | "." | ".." => Err(FhirError::InvalidPatientId(patient_id.to_string())),
        _ => Ok(()),
    }
}

#[async_trait]
impl FhirClient for EpicFhirClient {
    async fn fetch_patient(&self, patient_id: &str) -> Result<FhirResponse, FhirError> {
        let url = self.patient_url(patient_id)?;
        info!("Fetching FHIR patient from {}", url);

        let res = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.access_token))
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        if status != 200 {
            warn!("FHIR server answered {} for patient {}", status, patient_id);
        }
        Ok(FhirResponse { status, body })
    }
}
