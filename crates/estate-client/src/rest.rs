//! # REST Client
//!
//! HTTP implementation of the backend seams.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  url(segments) ─► request() ─────────────► execute::<Envelope>()        │
//! │   base + encoded   Authorization: Bearer     │                          │
//! │   path segments    X-Request-Id: <uuid v4>   ├─ transport error         │
//! │                                              │    timeout → Timeout(s)  │
//! │                                              │    other   → Http        │
//! │                                              ├─ non-2xx                 │
//! │                                              │    401/403 → Unauthorized│
//! │                                              │    404     → NotFound    │
//! │                                              │    409     → Conflict    │
//! │                                              ├─ success: false          │
//! │                                              │            → Rejected    │
//! │                                              └─ decoded envelope        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. Each call is sent exactly once and every failure is
//! handed back to the caller.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use estate_core::{
    BookedFlat, Customer, Flat, FlatKey, FlatPayment, KycFilter, KycSubmission, Money, NewProject,
    Page, Project, ProjectName,
};

use crate::api::{DirectoryApi, InventoryApi, LedgerApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::wire::{
    Ack, AddPaymentRequest, BookFlatRequest, BookedResponse, CreateProjectResponse,
    CustomersResponse, Envelope, FlatsResponse, HistoryResponse, KycResponse, PayResponse,
    PaymentsPage, ProjectNamesResponse, ProjectsResponse,
};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Authenticated client for the Estate ERP backend.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
    timeout_secs: u64,
}

impl RestClient {
    /// Builds a client from configuration and a signed-in session.
    pub fn new(config: &ClientConfig, session: Session) -> ClientResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.api.user_agent.clone())
            .build()?;

        Ok(RestClient {
            http,
            base: config.base_url()?,
            session,
            timeout_secs: config.api.request_timeout_secs,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drops the bearer token. Every later call fails with `MissingSession`.
    pub fn sign_out(&mut self) {
        self.session.clear();
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let token = self.session.bearer()?;
        let url = self.url(segments)?;
        let request_id = Uuid::new_v4().to_string();

        debug!(%method, %url, %request_id, "Sending request");

        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, request_id))
    }

    async fn execute<T>(&self, builder: RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            warn!(status = status.as_u16(), %url, %message, "Backend returned an error");
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let envelope: T = serde_json::from_slice(&bytes)?;

        if !envelope.success() {
            let message = envelope
                .message()
                .unwrap_or("request was not accepted")
                .to_string();
            warn!(%url, %message, "Backend rejected the request");
            return Err(ClientError::Rejected(message));
        }

        Ok(envelope)
    }

    async fn get<T>(&self, segments: &[&str], query: &[(&str, String)]) -> ClientResult<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let builder = self.request(Method::GET, segments)?.query(query);
        self.execute(builder).await
    }

    async fn send_json<T, B>(&self, method: Method, segments: &[&str], body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned + Envelope,
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, segments)?.json(body);
        self.execute(builder).await
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::from(err)
        }
    }
}

/// Pulls `message` (or `error`) out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn page_query(page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.max(1).to_string())]
}

fn customer_list_segments(filter: KycFilter) -> [&'static str; 2] {
    match filter {
        KycFilter::All => ["customer-kyc", ""],
        KycFilter::Approved => ["customer-kyc", "approved"],
        KycFilter::Pending => ["customer-kyc", "pending"],
    }
}

// =============================================================================
// Ledger
// =============================================================================

impl LedgerApi for RestClient {
    async fn book_flat(&self, key: &FlatKey, request: &BookFlatRequest) -> ClientResult<()> {
        let _: Ack = self
            .send_json(
                Method::POST,
                &["bookings", "flats", &key.project_id, &key.flat_id, "book"],
                request,
            )
            .await?;
        Ok(())
    }

    async fn booked_flat(&self, key: &FlatKey) -> ClientResult<BookedFlat> {
        let response: BookedResponse = self
            .get(
                &["bookings", "flats", &key.project_id, &key.flat_id, "booked"],
                &[],
            )
            .await?;
        Ok(response.booked)
    }

    async fn add_payment(&self, key: &FlatKey, request: &AddPaymentRequest) -> ClientResult<Money> {
        let response: PayResponse = self
            .send_json(
                Method::POST,
                &["payments", "flats", &key.project_id, &key.flat_id, "pay"],
                request,
            )
            .await?;
        Ok(response.paid)
    }

    async fn payment_history(&self, key: &FlatKey) -> ClientResult<Vec<FlatPayment>> {
        let response: HistoryResponse = self
            .get(&["payments", &key.project_id, &key.flat_id, "history"], &[])
            .await?;
        Ok(response.payments)
    }

    async fn all_payments(&self, page: u32) -> ClientResult<Page<FlatPayment>> {
        let response: PaymentsPage = self.get(&["payments", "all"], &page_query(page)).await?;
        Ok(response.into())
    }

    async fn search_payments(&self, query: &str, page: u32) -> ClientResult<Page<FlatPayment>> {
        let mut params = page_query(page);
        params.insert(0, ("q", query.to_string()));
        let response: PaymentsPage = self.get(&["payments", "search"], &params).await?;
        Ok(response.into())
    }

    async fn approve_loan(&self, key: &FlatKey) -> ClientResult<()> {
        let _: Ack = self
            .send_json(
                Method::PUT,
                &["projects", &key.project_id, "flats", &key.flat_id, "approve-loan"],
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }
}

// =============================================================================
// Directory
// =============================================================================

impl DirectoryApi for RestClient {
    async fn list_customers(&self, filter: KycFilter, page: u32) -> ClientResult<Page<Customer>> {
        let response: CustomersResponse = self
            .get(&customer_list_segments(filter), &page_query(page))
            .await?;
        Ok(response.into())
    }

    async fn search_customers(
        &self,
        filter: KycFilter,
        query: &str,
        page: u32,
    ) -> ClientResult<Page<Customer>> {
        let segments: &[&str] = match filter {
            KycFilter::All => &["customer-kyc", "search"],
            KycFilter::Approved => &["customer-kyc", "search", "approved"],
            KycFilter::Pending => &["customer-kyc", "search", "pending"],
        };
        let mut params = page_query(page);
        params.insert(0, ("q", query.to_string()));

        let response: CustomersResponse = self.get(segments, &params).await?;
        Ok(response.into())
    }

    async fn submit_kyc(&self, submission: &KycSubmission) -> ClientResult<Option<Customer>> {
        let response: KycResponse = self
            .send_json(Method::POST, &["customer-kyc", "kyc"], submission)
            .await?;
        Ok(response.customer)
    }

    async fn approve_kyc(&self, customer_id: &str) -> ClientResult<()> {
        let _: KycResponse = self
            .send_json(
                Method::PUT,
                &["customer-kyc", "approve", customer_id],
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    async fn delete_kyc(&self, customer_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["customer-kyc", "delete", customer_id])?;
        let _: KycResponse = self.execute(builder).await?;
        Ok(())
    }
}

// =============================================================================
// Inventory
// =============================================================================

impl InventoryApi for RestClient {
    async fn projects(&self) -> ClientResult<Vec<Project>> {
        let response: ProjectsResponse = self.get(&["projects"], &[]).await?;
        Ok(response.projects)
    }

    async fn project_names(&self) -> ClientResult<Vec<ProjectName>> {
        let response: ProjectNamesResponse =
            self.get(&["projects", "projects-id-name"], &[]).await?;
        Ok(response.projects)
    }

    async fn project_flats(&self, project_id: &str) -> ClientResult<Vec<Flat>> {
        let response: FlatsResponse = self.get(&["projects", "flats", project_id], &[]).await?;
        Ok(response.flats)
    }

    async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        let response: CreateProjectResponse =
            self.send_json(Method::POST, &["projects"], project).await?;
        Ok(response.project)
    }

    async fn delete_project(&self, project_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["projects", project_id])?;
        let _: Ack = self.execute(builder).await?;
        Ok(())
    }
}
