//! HTTP implementation of [`FranchiseBackend`] on top of reqwest.
//!
//! This module handles request construction, the per-request timeout,
//! request ids on mutations, and decoding the backend's response envelope.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::form::Attachment;
use crate::models::envelope::{ApiEnvelope, ErrorBody, OneOrMany, is_envelope};
use crate::models::{
    ActionAck, AgentLoginRequest, AgentLoginResponse, ApplicationRecord, ApplicationUpdate,
    BankAccount, BankAccountRequest, BankAssignment, CustomerCredentials, RecordKey,
    SubmissionReceipt,
};
use crate::services::backend::{ApplicationSubmission, FranchiseBackend};

/// Header carrying the client-generated id of a mutation request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Franchise backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Build a backend from configuration.
    ///
    /// # Errors
    ///
    /// - `API_BASE_URL` is not a valid URL
    /// - the HTTP client cannot be constructed
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Self::with_client(client, &config.api_base_url)
    }

    /// Use an existing reqwest client (shared connection pool, custom TLS).
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL plus path segments. Segments are percent-encoded, so ids and
    /// emails can be passed as they are.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidInput(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mutation = method != Method::GET;
        let builder = self.client.request(method, url);
        if mutation {
            builder.header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
        } else {
            builder
        }
    }

    /// Send a request and return the decoded body.
    ///
    /// # Process
    ///
    /// 1. Send the request (network failure → `Network`)
    /// 2. Decode the body as JSON; an empty body reads as `null`
    /// 3. Non-success status → `Backend` with the body's message
    /// 4. Envelope with `success: false` → `Backend` with its message
    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);
        tracing::debug!(%method, %url, request_id = ?request_id, "backend request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::error!(%method, %url, "backend request failed: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => body,
                // A failing endpoint may answer with an HTML error page
                Err(_) if !status.is_success() => Value::Null,
                Err(e) => return Err(e.into()),
            }
        };

        if !status.is_success() {
            let message = serde_json::from_value::<ErrorBody>(body)
                .unwrap_or_default()
                .message
                .unwrap_or_else(|| "Request failed".to_string());
            tracing::warn!(%method, %url, status = status.as_u16(), "backend rejected request: {}", message);
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        if is_envelope(&body) && body.get("success") == Some(&Value::Bool(false)) {
            let message = message_of(&body).unwrap_or_else(|| "Request failed".to_string());
            tracing::warn!(%method, %url, "backend reported failure: {}", message);
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Value> {
        let url = self.endpoint(segments)?;
        self.send(self.request(method, url).json(body)).await
    }

    async fn mutate_status(&self, action: &str, key: &RecordKey) -> Result<ActionAck> {
        let body = self.send_json(Method::POST, &["application", action], key).await?;
        Ok(ActionAck {
            message: message_of(&body),
            customer_id: customer_id_of(&body),
        })
    }
}

/// Payload of a response: `data` for envelopes, the body itself otherwise.
fn payload<T: DeserializeOwned>(body: Value) -> Result<Option<T>> {
    if is_envelope(&body) {
        Ok(serde_json::from_value::<ApiEnvelope<T>>(body)?.data)
    } else if body.is_null() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_value(body)?))
    }
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_owned)
}

fn customer_id_of(body: &Value) -> Option<String> {
    body.get("customerId")
        .or_else(|| body.get("data").and_then(|d| d.get("customerId")))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn file_part(file: Attachment) -> Result<Part> {
    Ok(Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)?)
}

#[async_trait]
impl FranchiseBackend for HttpBackend {
    async fn submit_application(&self, submission: ApplicationSubmission) -> Result<SubmissionReceipt> {
        let mut form = Form::new();
        for (name, value) in submission.fields {
            form = form.text(name, value);
        }
        for (name, file) in submission.files {
            form = form.part(name, file_part(file)?);
        }

        let url = self.endpoint(&["createApplication"])?;
        let body = self.send(self.request(Method::POST, url).multipart(form)).await?;

        // The form only counts a submission as accepted when the body says so
        if body.get("success") != Some(&Value::Bool(true)) {
            return Err(ClientError::Backend {
                status: 200,
                message: message_of(&body).unwrap_or_else(|| "Failed to submit application".to_string()),
            });
        }

        Ok(SubmissionReceipt {
            message: message_of(&body),
            application_id: body
                .get("data")
                .and_then(|d| d.get("_id"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        let body = self.get_json(&["applications"]).await?;
        Ok(payload::<Vec<ApplicationRecord>>(body)?.unwrap_or_default())
    }

    async fn list_agent_applications(&self, agent_id: &str) -> Result<Vec<ApplicationRecord>> {
        let body = self.get_json(&["application", "agent", agent_id]).await?;
        Ok(payload::<Vec<ApplicationRecord>>(body)?.unwrap_or_default())
    }

    async fn application_by_email(&self, email: &str) -> Result<ApplicationRecord> {
        let body = self.get_json(&["getApplication", "email", email]).await?;
        payload(body)?.ok_or_else(|| ClientError::NotFound(email.to_string()))
    }

    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()> {
        self.send_json(Method::PUT, &["application", id], update).await?;
        Ok(())
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["application", id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn approve(&self, key: &RecordKey) -> Result<ActionAck> {
        self.mutate_status("approve", key).await
    }

    async fn reject(&self, key: &RecordKey) -> Result<ActionAck> {
        self.mutate_status("reject", key).await
    }

    async fn send_agreement(&self, key: &RecordKey) -> Result<ActionAck> {
        self.mutate_status("agreement", key).await
    }

    async fn assign_bank(&self, assignment: &BankAssignment) -> Result<ActionAck> {
        let body = self
            .send_json(Method::POST, &["assignBankDetails"], assignment)
            .await?;
        Ok(ActionAck {
            message: message_of(&body),
            customer_id: None,
        })
    }

    async fn list_banks(&self) -> Result<Vec<BankAccount>> {
        let body = self.get_json(&["bank-details"]).await?;
        Ok(payload::<OneOrMany<BankAccount>>(body)?
            .map(OneOrMany::into_vec)
            .unwrap_or_default())
    }

    async fn create_bank(&self, request: &BankAccountRequest) -> Result<()> {
        self.send_json(Method::POST, &["bank-details"], request).await?;
        Ok(())
    }

    async fn update_bank(&self, id: &str, request: &BankAccountRequest) -> Result<()> {
        self.send_json(Method::PUT, &["bank-details", id], request).await?;
        Ok(())
    }

    async fn delete_bank(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["bank-details", id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn upload_bank_qr(&self, id: &str, image: Attachment) -> Result<()> {
        let form = Form::new().part("qrCode", file_part(image)?);
        let url = self.endpoint(&["bank-details", id, "qr-code"])?;
        self.send(self.request(Method::POST, url).multipart(form)).await?;
        Ok(())
    }

    async fn agent_login(&self, request: &AgentLoginRequest) -> Result<AgentLoginResponse> {
        let body = self.send_json(Method::POST, &["Agentlogin"], request).await?;
        // Ids sit at the top level; some deployments nest them under `data`
        let ids = body.get("data").filter(|d| d.is_object()).unwrap_or(&body);
        Ok(serde_json::from_value(ids.clone())?)
    }

    async fn customer_credentials(&self, email: &str) -> Result<CustomerCredentials> {
        let mut url = self.endpoint(&["customer", "credentials"])?;
        url.query_pairs_mut().append_pair("email", email);
        let body = self.send(self.request(Method::GET, url)).await?;
        payload(body)?.ok_or(ClientError::InvalidCredentials)
    }
}
