//! Gmail API store implementation.
//!
//! This module provides a [`MailStore`] implementation using the Gmail REST
//! API. It handles OAuth 2.0 token refresh and the thread, label, and
//! message endpoints the classification pipeline needs.
//!
//! # Authentication
//!
//! Gmail uses OAuth 2.0. The store is constructed with a refresh token plus
//! client credentials and exchanges them for an access token lazily, caching
//! it until the API reports it expired.
//!
//! # API Usage
//!
//! This store uses the Gmail API v1:
//! - `users.threads.list` for listing candidate threads
//! - `users.threads.get` for fetching complete threads
//! - `users.messages.get` for resolving a message's thread
//! - `users.labels.list` / `users.labels.create` for label management
//! - `users.threads.modify` for label mutations

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{MailStore, Result, StoreError, ThreadQuery};
use crate::domain::{
    system_labels, Address, Label, LabelColor, LabelId, Message, MessageId, Thread, ThreadId,
    ThreadSummary,
};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail API thread list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    threads: Option<Vec<GmailThreadRef>>,
    #[allow(dead_code)]
    next_page_token: Option<String>,
}

/// Gmail API thread reference from a list call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThreadRef {
    id: String,
    snippet: Option<String>,
}

/// Gmail API thread with messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThread {
    id: String,
    messages: Option<Vec<GmailMessage>>,
}

/// Gmail API message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    thread_id: String,
    label_ids: Option<Vec<String>>,
    snippet: Option<String>,
    payload: Option<GmailMessagePayload>,
    internal_date: Option<String>,
}

/// Gmail message payload (headers and body parts).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessagePayload {
    mime_type: Option<String>,
    headers: Option<Vec<GmailHeader>>,
    parts: Option<Vec<GmailPart>>,
    body: Option<GmailBody>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Gmail message part (for multipart messages).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    mime_type: Option<String>,
    filename: Option<String>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPart>>,
}

/// Gmail message body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailBody {
    data: Option<String>,
    attachment_id: Option<String>,
}

/// Gmail API label.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailLabel {
    id: String,
    name: String,
    #[serde(rename = "type")]
    label_type: Option<String>,
    message_list_visibility: Option<String>,
    label_list_visibility: Option<String>,
    color: Option<GmailLabelColor>,
}

/// Gmail label color pair.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailLabelColor {
    text_color: String,
    background_color: String,
}

/// Gmail labels list response.
#[derive(Debug, Deserialize)]
struct LabelsListResponse {
    labels: Option<Vec<GmailLabel>>,
}

/// Gmail label creation request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabelRequest {
    name: String,
    label_list_visibility: String,
    message_list_visibility: String,
    color: GmailLabelColor,
}

/// Gmail modify request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    add_label_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remove_label_ids: Vec<String>,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: u64,
}

/// OAuth credentials for the Gmail account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailCredentials {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth refresh token.
    pub refresh_token: String,
}

/// Gmail API store.
///
/// Implements [`MailStore`] using the Gmail REST API with OAuth 2.0
/// authentication.
///
/// # Example
///
/// ```ignore
/// use sift::providers::mail::{GmailStore, MailStore, ThreadQuery};
///
/// let store = GmailStore::new(credentials, Duration::from_secs(30))?;
/// let threads = store.list_threads(&ThreadQuery::inbox(50)).await?;
/// ```
pub struct GmailStore {
    /// HTTP client for API requests, carrying the configured timeout.
    client: reqwest::Client,
    /// OAuth credentials.
    credentials: GmailCredentials,
    /// Cached OAuth access token, refreshed on demand.
    access_token: RwLock<Option<String>>,
}

impl GmailStore {
    /// Creates a new Gmail store with the given credentials.
    ///
    /// Every store and token call runs under `timeout`.
    pub fn new(credentials: GmailCredentials, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Internal(format!("build http client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            access_token: RwLock::new(None),
        })
    }

    /// Returns the cached access token, refreshing it if absent.
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.access_token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut guard = self.access_token.write().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let token = self.refresh_access_token().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Exchanges the refresh token for a new access token.
    async fn refresh_access_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Authentication(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Internal(format!("parse token response: {}", e)))?;

        Ok(token_response.access_token)
    }

    /// Builds authorization headers for API requests.
    async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.access_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StoreError::Internal(format!("invalid header: {}", e)))?,
        );
        Ok(headers)
    }

    /// Makes an authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let headers = self.auth_headers().await?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(params)
            .send()
            .await
            .map_err(connection_error)?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request to the Gmail API.
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let mut headers = self.auth_headers().await?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request that doesn't return a body.
    async fn post_no_response<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let mut headers = self.auth_headers().await?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }
        Ok(())
    }

    /// Handles API response, checking for errors.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Internal(format!("parse response: {}", e)))
    }

    /// Handles API error responses.
    ///
    /// A 401 also drops the cached access token so the next call refreshes.
    async fn handle_error(&self, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            400 => StoreError::InvalidRequest(body),
            401 => {
                *self.access_token.write().await = None;
                StoreError::Authentication(format!("unauthorized: {}", body))
            }
            404 => StoreError::NotFound(body),
            409 => StoreError::Conflict(body),
            429 => StoreError::RateLimited {
                retry_after_secs: None,
            },
            _ => StoreError::Internal(format!("api error ({}): {}", status, body)),
        }
    }

    /// Parses an email address from a header value like "Name <email@example.com>".
    fn parse_address(value: &str) -> Address {
        let value = value.trim();
        if let Some(start) = value.find('<') {
            if let Some(end) = value.find('>') {
                let email = value[start + 1..end].trim().to_string();
                let name = value[..start].trim().trim_matches('"').to_string();
                return Address {
                    email,
                    name: if name.is_empty() { None } else { Some(name) },
                };
            }
        }
        Address {
            email: value.to_string(),
            name: None,
        }
    }

    /// Parses multiple addresses from a comma-separated header value.
    fn parse_addresses(value: &str) -> Vec<Address> {
        value
            .split(',')
            .map(|s| Self::parse_address(s.trim()))
            .collect()
    }

    /// Extracts the plain text and HTML bodies from a message payload.
    fn extract_body(payload: &GmailMessagePayload) -> (Option<String>, Option<String>) {
        let mut text = None;
        let mut html = None;

        // Single-part messages carry the body directly on the payload.
        if let Some(body) = &payload.body {
            if let Some(decoded) = decode_body_data(body) {
                match payload.mime_type.as_deref() {
                    Some("text/html") => html = Some(decoded),
                    _ => text = Some(decoded),
                }
            }
        }

        if let Some(parts) = &payload.parts {
            Self::extract_body_from_parts(parts, &mut text, &mut html);
        }

        (text, html)
    }

    /// Recursively extracts body content from message parts.
    fn extract_body_from_parts(
        parts: &[GmailPart],
        text: &mut Option<String>,
        html: &mut Option<String>,
    ) {
        for part in parts {
            let mime = part.mime_type.as_deref().unwrap_or("");

            if mime == "text/plain" && text.is_none() {
                if let Some(body) = &part.body {
                    if let Some(decoded) = decode_body_data(body) {
                        *text = Some(decoded);
                    }
                }
            } else if mime == "text/html" && html.is_none() {
                if let Some(body) = &part.body {
                    if let Some(decoded) = decode_body_data(body) {
                        *html = Some(decoded);
                    }
                }
            }

            if let Some(nested) = &part.parts {
                Self::extract_body_from_parts(nested, text, html);
            }
        }
    }

    /// Returns true when any part carries a named attachment.
    fn has_attachments(payload: &GmailMessagePayload) -> bool {
        fn parts_have_attachment(parts: &[GmailPart]) -> bool {
            parts.iter().any(|part| {
                let named = part.filename.as_deref().is_some_and(|f| !f.is_empty());
                let stored = part
                    .body
                    .as_ref()
                    .is_some_and(|b| b.attachment_id.is_some());
                named && stored
                    || part
                        .parts
                        .as_ref()
                        .is_some_and(|nested| parts_have_attachment(nested))
            })
        }

        payload
            .parts
            .as_ref()
            .is_some_and(|parts| parts_have_attachment(parts))
    }

    /// Converts a Gmail message to the domain Message type.
    fn gmail_message_to_message(msg: &GmailMessage) -> Message {
        let payload = msg.payload.as_ref();
        let headers = payload.and_then(|p| p.headers.as_ref());

        let get_header = |name: &str| -> Option<String> {
            headers.and_then(|h| {
                h.iter()
                    .find(|hdr| hdr.name.eq_ignore_ascii_case(name))
                    .map(|hdr| hdr.value.clone())
            })
        };

        let from = get_header("From")
            .map(|v| Self::parse_address(&v))
            .unwrap_or_else(|| Address::new("unknown@unknown.com"));

        let to = get_header("To")
            .map(|v| Self::parse_addresses(&v))
            .unwrap_or_default();

        let cc = get_header("Cc")
            .map(|v| Self::parse_addresses(&v))
            .unwrap_or_default();

        let subject = get_header("Subject");

        let date = msg
            .internal_date
            .as_ref()
            .and_then(|d| d.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        let label_strings = msg.label_ids.clone().unwrap_or_default();
        let is_from_owner = label_strings.iter().any(|l| l == &system_labels::sent().0);
        let labels: Vec<LabelId> = label_strings.into_iter().map(LabelId::from).collect();

        let (body_text, body_html) = payload.map(Self::extract_body).unwrap_or((None, None));
        let body_text = body_text
            .or_else(|| body_html.as_deref().map(strip_html_tags))
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let has_attachments = payload.map(Self::has_attachments).unwrap_or(false);

        Message {
            id: MessageId::from(msg.id.clone()),
            thread_id: ThreadId::from(msg.thread_id.clone()),
            from,
            to,
            cc,
            subject,
            body_text,
            snippet: msg.snippet.clone().unwrap_or_default(),
            date,
            is_from_owner,
            has_attachments,
            labels,
        }
    }

    /// Converts a Gmail label to the domain Label type.
    fn gmail_label_to_label(label: GmailLabel) -> Label {
        let is_system = label.label_type.as_deref() == Some("system");
        // Gmail omits visibility fields when they hold the default (shown).
        let visible_in_list = label
            .label_list_visibility
            .as_deref()
            .map(|v| v == "labelShow" || v == "labelShowIfUnread")
            .unwrap_or(true);
        let visible_on_messages = label
            .message_list_visibility
            .as_deref()
            .map(|v| v == "show")
            .unwrap_or(true);

        Label {
            id: LabelId::from(label.id),
            name: label.name,
            color: label
                .color
                .map(|c| LabelColor::new(c.text_color, c.background_color)),
            visible_in_list,
            visible_on_messages,
            is_system,
        }
    }
}

/// Maps a reqwest error to a store error, distinguishing timeouts.
fn connection_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Connection(format!("request timed out: {}", e))
    } else {
        StoreError::Connection(e.to_string())
    }
}

/// Decodes a base64url-encoded body into a UTF-8 string.
fn decode_body_data(body: &GmailBody) -> Option<String> {
    let data = body.data.as_ref()?;
    let decoded = BASE64_URL_SAFE_NO_PAD.decode(data).ok()?;
    String::from_utf8(decoded).ok()
}

/// Strips HTML tags, keeping only the text content.
fn strip_html_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[async_trait]
impl MailStore for GmailStore {
    async fn list_threads(&self, query: &ThreadQuery) -> Result<Vec<ThreadSummary>> {
        let mut params = vec![(
            "maxResults",
            query.limit.unwrap_or(100).to_string(),
        )];
        if let Some(q) = &query.query {
            params.push(("q", q.clone()));
        }

        let response: ThreadListResponse = self.get("/threads", &params).await?;

        Ok(response
            .threads
            .unwrap_or_default()
            .into_iter()
            .map(|t| ThreadSummary {
                id: ThreadId::from(t.id),
                snippet: t.snippet.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_thread(&self, thread_id: &ThreadId) -> Result<Thread> {
        let endpoint = format!("/threads/{}", thread_id.0);
        let params = [("format", "full".to_string())];
        let response: GmailThread = self.get(&endpoint, &params).await?;

        let mut messages: Vec<Message> = response
            .messages
            .unwrap_or_default()
            .iter()
            .map(Self::gmail_message_to_message)
            .collect();
        messages.sort_by_key(|m| m.date);

        let mut labels: Vec<LabelId> = Vec::new();
        for msg in &messages {
            for label in &msg.labels {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }

        Ok(Thread {
            id: ThreadId::from(response.id),
            messages,
            labels,
        })
    }

    async fn resolve_message_thread(&self, message_id: &MessageId) -> Result<ThreadId> {
        let endpoint = format!("/messages/{}", message_id.0);
        let params = [("format", "minimal".to_string())];
        let response: GmailMessage = self.get(&endpoint, &params).await?;
        Ok(ThreadId::from(response.thread_id))
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        let response: LabelsListResponse = self.get("/labels", &[]).await?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(Self::gmail_label_to_label)
            .collect())
    }

    async fn create_label(&self, name: &str, color: &LabelColor) -> Result<Label> {
        let body = CreateLabelRequest {
            name: name.to_string(),
            label_list_visibility: "labelShow".to_string(),
            message_list_visibility: "show".to_string(),
            color: GmailLabelColor {
                text_color: color.text.clone(),
                background_color: color.background.clone(),
            },
        };

        let created: GmailLabel = self.post("/labels", &body).await?;
        tracing::debug!(label = %created.name, id = %created.id, "created gmail label");
        Ok(Self::gmail_label_to_label(created))
    }

    async fn modify_thread_labels(
        &self,
        thread_id: &ThreadId,
        add: &[LabelId],
        remove: &[LabelId],
    ) -> Result<()> {
        if add.is_empty() && remove.is_empty() {
            return Ok(());
        }

        let endpoint = format!("/threads/{}/modify", thread_id.0);
        let body = ModifyRequest {
            add_label_ids: add.iter().map(|l| l.0.clone()).collect(),
            remove_label_ids: remove.iter().map(|l| l.0.clone()).collect(),
        };

        self.post_no_response(&endpoint, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_address_with_name() {
        let addr = GmailStore::parse_address("John Doe <john@example.com>");
        assert_eq!(addr.email, "john@example.com");
        assert_eq!(addr.name, Some("John Doe".to_string()));
    }

    #[test]
    fn parse_address_quoted_name() {
        let addr = GmailStore::parse_address("\"Doe, John\" <john@example.com>");
        assert_eq!(addr.email, "john@example.com");
        assert_eq!(addr.name, Some("Doe, John".to_string()));
    }

    #[test]
    fn parse_address_bare_email() {
        let addr = GmailStore::parse_address("john@example.com");
        assert_eq!(addr.email, "john@example.com");
        assert!(addr.name.is_none());
    }

    #[test]
    fn parse_addresses_comma_separated() {
        let addrs = GmailStore::parse_addresses("a@example.com, B <b@example.com>");
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0].email, "a@example.com");
        assert_eq!(addrs[1].email, "b@example.com");
        assert_eq!(addrs[1].name, Some("B".to_string()));
    }

    #[test]
    fn strip_html_keeps_text() {
        let html = "<div><p>Hello <b>world</b></p><img src=\"x\"></div>";
        assert_eq!(strip_html_tags(html), "Hello world");
    }

    #[test]
    fn modify_request_skips_empty_lists() {
        let body = ModifyRequest {
            add_label_ids: vec!["Label_1".to_string()],
            remove_label_ids: vec![],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, "{\"addLabelIds\":[\"Label_1\"]}");
    }

    #[test]
    fn create_label_request_is_camel_case() {
        let body = CreateLabelRequest {
            name: "To Do".to_string(),
            label_list_visibility: "labelShow".to_string(),
            message_list_visibility: "show".to_string(),
            color: GmailLabelColor {
                text_color: "#ffffff".to_string(),
                background_color: "#fb4c2f".to_string(),
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"labelListVisibility\":\"labelShow\""));
        assert!(json.contains("\"backgroundColor\":\"#fb4c2f\""));
    }

    #[test]
    fn message_mapping_from_api_json() {
        let encoded = BASE64_URL_SAFE_NO_PAD.encode("Please review the attached draft.");
        let raw = format!(
            r#"{{
                "id": "m1",
                "threadId": "t1",
                "labelIds": ["INBOX", "UNREAD"],
                "snippet": "Please review...",
                "internalDate": "1700000000000",
                "payload": {{
                    "mimeType": "multipart/mixed",
                    "headers": [
                        {{"name": "From", "value": "Alice <alice@example.com>"}},
                        {{"name": "To", "value": "me@example.com"}},
                        {{"name": "Subject", "value": "Draft for review"}}
                    ],
                    "parts": [
                        {{
                            "mimeType": "text/plain",
                            "filename": "",
                            "body": {{"data": "{}"}}
                        }},
                        {{
                            "mimeType": "application/pdf",
                            "filename": "draft.pdf",
                            "body": {{"attachmentId": "att-1"}}
                        }}
                    ]
                }}
            }}"#,
            encoded
        );

        let api_msg: GmailMessage = serde_json::from_str(&raw).unwrap();
        let message = GmailStore::gmail_message_to_message(&api_msg);

        assert_eq!(message.id, MessageId::from("m1"));
        assert_eq!(message.thread_id, ThreadId::from("t1"));
        assert_eq!(message.from.email, "alice@example.com");
        assert_eq!(message.subject, Some("Draft for review".to_string()));
        assert_eq!(
            message.body_text,
            Some("Please review the attached draft.".to_string())
        );
        assert!(message.has_attachments);
        assert!(!message.is_from_owner);
        assert_eq!(
            message.date,
            DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
        );
    }

    #[test]
    fn sent_label_marks_owner_message() {
        let raw = r#"{
            "id": "m2",
            "threadId": "t1",
            "labelIds": ["SENT"],
            "internalDate": "1700000100000"
        }"#;

        let api_msg: GmailMessage = serde_json::from_str(raw).unwrap();
        let message = GmailStore::gmail_message_to_message(&api_msg);
        assert!(message.is_from_owner);
    }

    #[test]
    fn html_only_body_is_stripped() {
        let encoded = BASE64_URL_SAFE_NO_PAD.encode("<p>Deal of the <b>week</b>!</p>");
        let raw = format!(
            r#"{{
                "id": "m3",
                "threadId": "t2",
                "internalDate": "1700000200000",
                "payload": {{
                    "mimeType": "text/html",
                    "headers": [],
                    "body": {{"data": "{}"}}
                }}
            }}"#,
            encoded
        );

        let api_msg: GmailMessage = serde_json::from_str(&raw).unwrap();
        let message = GmailStore::gmail_message_to_message(&api_msg);
        assert_eq!(message.body_text, Some("Deal of the week!".to_string()));
    }

    #[test]
    fn nested_multipart_alternative_prefers_plain_text() {
        let text = BASE64_URL_SAFE_NO_PAD.encode("plain body");
        let html = BASE64_URL_SAFE_NO_PAD.encode("<p>html body</p>");
        let raw = format!(
            r#"{{
                "id": "m4",
                "threadId": "t3",
                "internalDate": "1700000300000",
                "payload": {{
                    "mimeType": "multipart/mixed",
                    "headers": [],
                    "parts": [
                        {{
                            "mimeType": "multipart/alternative",
                            "parts": [
                                {{"mimeType": "text/html", "body": {{"data": "{}"}}}},
                                {{"mimeType": "text/plain", "body": {{"data": "{}"}}}}
                            ]
                        }}
                    ]
                }}
            }}"#,
            html, text
        );

        let api_msg: GmailMessage = serde_json::from_str(&raw).unwrap();
        let message = GmailStore::gmail_message_to_message(&api_msg);
        assert_eq!(message.body_text, Some("plain body".to_string()));
    }

    #[test]
    fn label_mapping_with_color_and_visibility() {
        let raw = r##"{
            "id": "Label_9",
            "name": "To Do",
            "type": "user",
            "labelListVisibility": "labelShow",
            "messageListVisibility": "show",
            "color": {"textColor": "#ffffff", "backgroundColor": "#fb4c2f"}
        }"##;

        let api_label: GmailLabel = serde_json::from_str(raw).unwrap();
        let label = GmailStore::gmail_label_to_label(api_label);

        assert_eq!(label.id, LabelId::from("Label_9"));
        assert!(!label.is_system);
        assert!(label.visible_in_list);
        assert_eq!(
            label.color,
            Some(LabelColor::new("#ffffff", "#fb4c2f"))
        );
    }

    #[test]
    fn system_label_defaults_to_visible() {
        let raw = r#"{"id": "SPAM", "name": "SPAM", "type": "system"}"#;
        let api_label: GmailLabel = serde_json::from_str(raw).unwrap();
        let label = GmailStore::gmail_label_to_label(api_label);

        assert!(label.is_system);
        assert!(label.visible_in_list);
        assert!(label.color.is_none());
    }
}
