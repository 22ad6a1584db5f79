use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::sample::{
    format_earnings, has_accepted_extension, known_preference, DEMO_OCR_TEXT, MOCK_INSIGHTS, SAMPLE_USER,
    SHARING_PREFERENCES, UPLOAD_OCR_TEXT,
};
use super::{escape_html, layout, Page, UiSettings};

pub async fn home() -> Html<String> {
    let body = format!(
        r#"<h1>Welcome to Veritas One</h1>
<p>Manage and monetize your health data securely.</p>
<h3>Get Started</h3>
<p><a href="{}">Sign Up</a> <a href="{}">Log In</a></p>"#,
        Page::Register.path(),
        Page::Dashboard.path(),
    );
    layout(Page::Home, "", &body)
}

pub async fn privacy() -> Html<String> {
    layout(Page::Privacy, "", PRIVACY_TEXT)
}

const PRIVACY_TEXT: &str = r#"<h1>How Your Health Data is Stored &amp; Used</h1>
<p>At Veritas One, we use a <strong>two-database system</strong> to keep your identifiable and de-identified data separate.</p>
<h3>1. Your Identifiable Data (Stored in a Secure Personal Health Record)</h3>
<ul>
<li><strong>Stored in:</strong> A HIPAA-compliant, secure personal health record.</li>
<li><strong>Usage:</strong> Shared only with your consent for medical care or personalized health services.</li>
<li><strong>Who Can See It?</strong> Only you and those you explicitly share it with.</li>
</ul>
<h3>2. Your De-Identified Data (Used for Medical Research &amp; Insights)</h3>
<ul>
<li><strong>Stored in:</strong> A separate research database without any identifying information.</li>
<li><strong>Usage:</strong> Helps improve medicine, public health, and clinical care.</li>
<li><strong>Who Can See It?</strong> Researchers and analysts, but they never see personal identifiers.</li>
</ul>
<h3>Your Control, Your Choice</h3>
<ul>
<li><strong>No Sharing:</strong> Fully private, no compensation, storage fee may apply.</li>
<li><strong>Research Only:</strong> De-identified data used for medical research (5% profit share).</li>
<li><strong>Research + Ads:</strong> De-identified + limited identifiable data for health ads (15% profit share).</li>
</ul>"#;

fn preference_radios(name: &str, selected: &str) -> String {
    SHARING_PREFERENCES
        .iter()
        .map(|pref| {
            let checked = if *pref == selected { " checked" } else { "" };
            format!(
                r#"<label><input type="radio" name="{}" value="{}"{}> {}</label><br>"#,
                name,
                escape_html(pref),
                checked,
                escape_html(pref)
            )
        })
        .collect()
}

fn register_page(notice: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Patient Registration</h1>
{notice}
<form method="post" action="{action}">
<label>Full Name <input name="name"></label><br>
<label>Email <input name="email" type="email"></label><br>
<label>Date of Birth <input name="dob" type="date"></label><br>
<label><input type="checkbox" name="consent" value="on"> I agree to the Terms and Conditions</label><br>
<fieldset>
<legend>Data Sharing Preferences</legend>
<small>Select how your data is shared and how you can earn.</small><br>
{radios}
</fieldset>
<button type="submit">Register</button>
</form>"#,
        notice = notice,
        action = Page::Register.path(),
        radios = preference_radios("sharing_preference", SHARING_PREFERENCES[0]),
    );
    layout(Page::Register, "", &body)
}

pub async fn register_form() -> Html<String> {
    register_page("")
}

/// Only the fields that decide the outcome; name, email and date of birth
/// are accepted by the form and discarded.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub consent: Option<String>,
    pub sharing_preference: Option<String>,
}

/// Accepts the registration form and stores nothing.
pub async fn register_submit(Form(form): Form<RegisterForm>) -> Html<String> {
    if form.consent.is_none() {
        return register_page(r#"<p class="warning">Please agree to the Terms and Conditions to register.</p>"#);
    }

    info!(
        "Mock registration accepted (sharing preference: {})",
        known_preference(form.sharing_preference.as_deref())
    );
    let head = format!(r#"<meta http-equiv="refresh" content="2; url={}">"#, Page::Dashboard.path());
    let body = r#"<h1>Patient Registration</h1>
<p class="success">Registration Successful! Redirecting to Dashboard...</p>"#;
    layout(Page::Register, &head, body)
}

pub async fn dashboard() -> Html<String> {
    let rows: String = SAMPLE_USER
        .fhir_data
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                row.date, row.diagnosis, row.medication
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Patient Dashboard</h1>
<h2>Welcome, {name}</h2>
<p>{email} &middot; born {dob}</p>
<h3>Your Health Data</h3>
<table>
<tr><th>Date</th><th>Diagnosis</th><th>Medication</th></tr>
{rows}
</table>
<h3>Your Data Control</h3>
<p><strong>Current Data Sharing Setting:</strong> {sharing}</p>
<p><a href="{earnings_path}">Change Sharing Preferences</a></p>
<h3>Uploaded Documents</h3>
<p>No documents uploaded yet.</p>
<h3>Earnings Overview</h3>
<p>Total Earnings</p>
<p class="metric">{earnings}</p>"#,
        name = escape_html(SAMPLE_USER.name),
        email = escape_html(SAMPLE_USER.email),
        dob = escape_html(SAMPLE_USER.dob),
        rows = rows,
        sharing = escape_html(SAMPLE_USER.data_sharing),
        earnings_path = Page::Earnings.path(),
        earnings = format_earnings(SAMPLE_USER.earnings),
    );
    layout(Page::Dashboard, "", &body)
}

#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    pub preference: Option<String>,
}

/// Earnings are the sample figure whatever preference is chosen.
pub async fn earnings(Query(query): Query<EarningsQuery>) -> Html<String> {
    let preference = known_preference(query.preference.as_deref());
    let body = format!(
        r#"<h1>Your Earnings</h1>
<p>Total Earnings</p>
<p class="metric">{earnings}</p>
<h3>Adjust Data Sharing Level</h3>
<form method="get" action="{action}">
{radios}
<button type="submit">Change Sharing Preference</button>
</form>
<p class="success">Updated preference: {preference}</p>
<p><a href="{dashboard}">Go to Dashboard</a></p>"#,
        earnings = format_earnings(SAMPLE_USER.earnings),
        action = Page::Earnings.path(),
        radios = preference_radios("preference", preference),
        preference = escape_html(preference),
        dashboard = Page::Dashboard.path(),
    );
    layout(Page::Earnings, "", &body)
}

fn upload_form_html(action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{}" enctype="multipart/form-data">
<label>{} <input type="file" name="file" accept=".pdf,.jpg,.png"></label>
<button type="submit">Upload</button>
</form>"#,
        action, label
    )
}

fn upload_page(result: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Upload Medical Records</h1>
{form}
{result}
<p><a href="{dashboard}">Go to Dashboard</a></p>"#,
        form = upload_form_html(Page::Upload.path(), "Upload a Medical Record (PDF, JPG, PNG)"),
        result = result,
        dashboard = Page::Dashboard.path(),
    );
    layout(Page::Upload, "", &body)
}

pub async fn upload_form() -> Html<String> {
    upload_page("")
}

/// Outcome of reading the `file` field of an upload form.
enum Uploaded {
    File { name: String, size: usize },
    Missing,
    Rejected(String),
}

async fn read_upload(multipart: &mut Multipart) -> Result<Uploaded, (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        // the content is drained and dropped; nothing is stored
        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        if name.is_empty() {
            return Ok(Uploaded::Missing);
        }
        if !has_accepted_extension(&name) {
            return Ok(Uploaded::Rejected(name));
        }
        return Ok(Uploaded::File { name, size: data.len() });
    }
    Ok(Uploaded::Missing)
}

fn upload_error(status: StatusCode, page: Html<String>) -> Response {
    (status, page).into_response()
}

pub async fn upload_submit(State(settings): State<UiSettings>, mut multipart: Multipart) -> Response {
    let uploaded = match read_upload(&mut multipart).await {
        Ok(uploaded) => uploaded,
        Err((status, message)) => {
            warn!("Malformed upload: {}", message);
            let notice = format!(r#"<p class="warning">Upload failed: {}</p>"#, escape_html(&message));
            return upload_error(status, upload_page(&notice));
        }
    };

    match uploaded {
        Uploaded::File { name, size } => {
            info!("Mock OCR on '{}' ({} bytes)", name, size);
            tokio::time::sleep(settings.ocr_delay).await;
            let result = format!(
                r#"<p class="success">File '{}' uploaded successfully!</p>
<p>Processing OCR...</p>
<p>Extracted Text: <strong>{}</strong></p>"#,
                escape_html(&name),
                UPLOAD_OCR_TEXT
            );
            upload_page(&result).into_response()
        }
        Uploaded::Missing => upload_error(
            StatusCode::BAD_REQUEST,
            upload_page(r#"<p class="warning">Please choose a file to upload.</p>"#),
        ),
        Uploaded::Rejected(name) => upload_error(
            StatusCode::BAD_REQUEST,
            upload_page(&format!(
                r#"<p class="warning">'{}' is not a PDF, JPG or PNG file.</p>"#,
                escape_html(&name)
            )),
        ),
    }
}

fn investor_page(ocr_result: &str) -> Html<String> {
    let fhir_json = serde_json::to_string_pretty(SAMPLE_USER.fhir_data).unwrap_or_default();
    let insights: String = MOCK_INSIGHTS
        .iter()
        .map(|insight| format!("<li>{}</li>", escape_html(insight)))
        .collect();

    let body = format!(
        r#"<h1>Investor Demo: Backend Simulation</h1>
<h3>1. Mock FHIR API Query</h3>
<pre>{fhir_json}</pre>
<h3>2. Upload &amp; OCR a Sample Record</h3>
{form}
{ocr_result}
<h3>3. AI-Generated Insights (Mock)</h3>
<ul>{insights}</ul>"#,
        fhir_json = escape_html(&fhir_json),
        form = upload_form_html("/ui/investor/ocr", "Upload a Sample Record"),
        ocr_result = ocr_result,
        insights = insights,
    );
    layout(Page::Investor, "", &body)
}

pub async fn investor() -> Html<String> {
    investor_page("")
}

pub async fn investor_ocr(State(settings): State<UiSettings>, mut multipart: Multipart) -> Response {
    match read_upload(&mut multipart).await {
        Ok(Uploaded::File { name, .. }) => {
            info!("Mock demo OCR on '{}'", name);
            tokio::time::sleep(settings.ocr_delay).await;
            let result = format!(
                r#"<p class="success">File uploaded! Processing OCR...</p>
<p>Extracted Data: <strong>{}</strong></p>"#,
                DEMO_OCR_TEXT
            );
            investor_page(&result).into_response()
        }
        Ok(Uploaded::Missing) => upload_error(
            StatusCode::BAD_REQUEST,
            investor_page(r#"<p class="warning">Please choose a file to upload.</p>"#),
        ),
        Ok(Uploaded::Rejected(name)) => upload_error(
            StatusCode::BAD_REQUEST,
            investor_page(&format!(
                r#"<p class="warning">'{}' is not a PDF, JPG or PNG file.</p>"#,
                escape_html(&name)
            )),
        ),
        Err((status, message)) => upload_error(
            status,
            investor_page(&format!(r#"<p class="warning">Upload failed: {}</p>"#, escape_html(&message))),
        ),
    }
}
