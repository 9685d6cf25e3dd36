use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};

/// Error type for SDK operations.
#[derive(Debug)]
pub enum SdkError {
    Http(reqwest::Error),
    Status(StatusCode, String),
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdkError::Http(e) => write!(f, "HTTP error: {}", e),
            SdkError::Status(code, body) => write!(f, "Console returned {}: {}", code, body),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Http(e)
    }
}

/// Client for the wire-console HTTP API.
///
/// Sessions are cookie-based; `login` must be called before any
/// authenticated operation. All fragment endpoints are requested with the
/// `HX-Request` header set, matching what the browser shell sends.
pub struct ConsoleClient {
    client: Client,
    base_url: String,
}

impl ConsoleClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .cookie_provider(Arc::new(reqwest::cookie::Jar::default()))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn expect_success(resp: Response) -> Result<String, SdkError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(SdkError::Status(status, text));
        }
        Ok(text)
    }

    /// Authenticate and store the session cookie for later calls.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SdkError> {
        let resp = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        Self::expect_success(resp).await?;
        Ok(())
    }

    /// Create an organisation, returning its id.
    pub async fn create_org(&self, name: &str, description: &str) -> Result<u64, SdkError> {
        let resp = self
            .client
            .post(self.url("/orgs"))
            .form(&[("name", name), ("description", description)])
            .send()
            .await?;
        let body = Self::expect_success(resp).await?;
        let v: serde_json::Value = serde_json::from_str(&body)
            .map_err(|_| SdkError::Status(StatusCode::OK, body.clone()))?;
        Ok(v["id"].as_u64().unwrap_or(0))
    }

    /// Fetch the members panel fragment for an org.
    pub async fn members_block(&self, org_id: u64) -> Result<String, SdkError> {
        let resp = self
            .client
            .get(self.url(&format!("/orgs/{}/members", org_id)))
            .header("HX-Request", "true")
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Invite an email address into an org.
    pub async fn create_invite(&self, org_id: u64, email: &str, role: &str) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/invites", org_id)))
            .header("HX-Request", "true")
            .form(&[("email", email), ("role", role)])
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Accept an invite by token (as the currently logged-in user).
    pub async fn accept_invite(&self, token: &str) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/invites/accept/{}", token)))
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Change a member's role. Returns the re-rendered members panel.
    pub async fn update_member_role(
        &self,
        org_id: u64,
        member_id: u64,
        role: &str,
    ) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/members/{}/role", org_id, member_id)))
            .header("HX-Request", "true")
            .form(&[("role", role)])
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Toggle a member active/inactive. Returns the re-rendered members panel.
    pub async fn toggle_member(
        &self,
        org_id: u64,
        member_id: u64,
        active: bool,
    ) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/members/{}/toggle", org_id, member_id)))
            .header("HX-Request", "true")
            .form(&[("active", if active { "1" } else { "0" })])
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Create an incident, returning its id.
    pub async fn create_incident(
        &self,
        org_id: u64,
        title: &str,
        classification: &str,
        severity: &str,
        aware_at: &str,
    ) -> Result<u64, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/incidents", org_id)))
            .form(&[
                ("title", title),
                ("classification", classification),
                ("severity", severity),
                ("aware_at", aware_at),
            ])
            .send()
            .await?;
        let body = Self::expect_success(resp).await?;
        let v: serde_json::Value = serde_json::from_str(&body)
            .map_err(|_| SdkError::Status(StatusCode::OK, body.clone()))?;
        Ok(v["id"].as_u64().unwrap_or(0))
    }

    /// Mark an incident as reported. Returns the swapped status/timer cells.
    pub async fn submit_report(
        &self,
        org_id: u64,
        incident_id: u64,
        notes: &str,
        reference: &str,
    ) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/incidents/{}/submit-report", org_id, incident_id)))
            .header("HX-Request", "true")
            .form(&[("report_notes", notes), ("report_reference", reference)])
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Fetch the Annex E style JSON export for an incident.
    pub async fn annex_export(&self, org_id: u64, incident_id: u64) -> Result<serde_json::Value, SdkError> {
        let resp = self
            .client
            .get(self.url(&format!("/orgs/{}/incidents/{}/annex.json", org_id, incident_id)))
            .send()
            .await?;
        let body = Self::expect_success(resp).await?;
        serde_json::from_str(&body).map_err(|_| SdkError::Status(StatusCode::OK, body))
    }

    /// Fetch the compliance records fragment, optionally filtered by status.
    pub async fn records_block(&self, org_id: u64, status: Option<&str>) -> Result<String, SdkError> {
        let mut req = self
            .client
            .get(self.url(&format!("/orgs/{}/records", org_id)))
            .header("HX-Request", "true");
        if let Some(s) = status {
            req = req.query(&[("status", s)]);
        }
        let resp = req.send().await?;
        Self::expect_success(resp).await
    }

    /// Create a compliance record, returning its id.
    pub async fn create_record(&self, org_id: u64, requirement: &str) -> Result<u64, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/records", org_id)))
            .form(&[("requirement", requirement)])
            .send()
            .await?;
        let body = Self::expect_success(resp).await?;
        let v: serde_json::Value = serde_json::from_str(&body)
            .map_err(|_| SdkError::Status(StatusCode::OK, body.clone()))?;
        Ok(v["id"].as_u64().unwrap_or(0))
    }

    /// Change a compliance record's status. Returns the records fragment.
    pub async fn update_record_status(
        &self,
        org_id: u64,
        record_id: u64,
        status: &str,
    ) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url(&format!("/orgs/{}/records/{}/status", org_id, record_id)))
            .header("HX-Request", "true")
            .form(&[("status", status)])
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// Raw GET against the console (health checks and similar).
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client.get(self.url(path)).send().await
    }
}
