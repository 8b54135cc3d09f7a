use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::EtapiConfig;
use crate::etapi::error::{EtapiError, EtapiResult};
use crate::etapi::models::{
    Attribute, AttributeType, CreateAttributeRequest, CreateNoteParams, CreatedNote, Note,
    ParentPatch, SearchResult, UpdateAttributeRequest, UpdateNoteParams,
};

/// HTTP client for Trilium's ETAPI.
///
/// Holds only the immutable base URL and a pooled [`reqwest::Client`] whose
/// default headers carry the token, so concurrent calls never share request
/// state. Failures are returned as-is: no retries, no fallbacks.
pub struct TriliumClient {
    base_url: String,
    base: Url,
    client: Client,
}

impl TriliumClient {
    /// Create a client for the given configuration
    ///
    /// Every request sends `Authorization: <token>` and defaults to
    /// `Content-Type: application/json`.
    pub fn new(config: &EtapiConfig) -> EtapiResult<Self> {
        let mut token =
            HeaderValue::from_str(config.token()).map_err(|_| EtapiError::InvalidToken)?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| EtapiError::ClientBuild {
                message: e.to_string(),
            })?;

        let base = Url::parse(config.base_url())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| EtapiError::ClientBuild {
                message: format!("invalid base URL '{}'", config.base_url()),
            })?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            base,
            client,
        })
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base path, percent-encoding each one.
    ///
    /// Identifiers that the URL parser would drop or resolve (`.`, `..`) or
    /// that leave an empty segment are rejected.
    fn endpoint(&self, segments: &[&str]) -> EtapiResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(EtapiError::InvalidIdentifier {
                id: bad.to_string(),
            });
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| EtapiError::ClientBuild {
                message: format!("invalid base URL '{}'", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> EtapiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "ETAPI request");
        Ok(self.client.request(method, url))
    }

    /// Decode a JSON reply, or turn a non-2xx status into [`EtapiError::ApiError`].
    async fn handle_response<T: DeserializeOwned>(response: Response) -> EtapiResult<T> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn handle_text(response: Response) -> EtapiResult<String> {
        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }

    async fn handle_empty(response: Response) -> EtapiResult<()> {
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> EtapiResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(EtapiError::from_status(status, &body))
    }

    /// Full-text search using Trilium's search syntax.
    pub async fn search_notes(&self, query: &str) -> EtapiResult<SearchResult> {
        let response = self
            .request(Method::GET, &["notes"])?
            .query(&[("search", query)])
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn get_note(&self, note_id: &str) -> EtapiResult<Note> {
        let response = self
            .request(Method::GET, &["notes", note_id])?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Raw note content, returned verbatim.
    pub async fn get_note_content(&self, note_id: &str) -> EtapiResult<String> {
        let response = self
            .request(Method::GET, &["notes", note_id, "content"])?
            .send()
            .await?;
        Self::handle_text(response).await
    }

    pub async fn create_note(&self, params: &CreateNoteParams) -> EtapiResult<CreatedNote> {
        let response = self
            .request(Method::POST, &["create-note"])?
            .json(params)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Apply a partial update and return the note as the service now sees it.
    ///
    /// The metadata PATCH fires only when title, type or mime is present. The
    /// content PUT fires whenever content is present, including an empty
    /// string. The final read always happens.
    pub async fn update_note(&self, note_id: &str, params: &UpdateNoteParams) -> EtapiResult<Note> {
        if let Some(patch) = params.metadata_patch() {
            let response = self
                .request(Method::PATCH, &["notes", note_id])?
                .json(&patch)
                .send()
                .await?;
            Self::handle_empty(response).await?;
        }

        if let Some(content) = &params.content {
            let response = self
                .request(Method::PUT, &["notes", note_id, "content"])?
                .header(CONTENT_TYPE, "text/plain")
                .body(content.clone())
                .send()
                .await?;
            Self::handle_empty(response).await?;
        }

        self.get_note(note_id).await
    }

    /// Reparent a note under `parent_note_id`.
    ///
    /// Replaces the whole parent list, so a cloned note loses every other
    /// placement.
    pub async fn move_note(&self, note_id: &str, parent_note_id: &str) -> EtapiResult<Note> {
        let response = self
            .request(Method::PATCH, &["notes", note_id])?
            .json(&ParentPatch {
                parent_note_ids: [parent_note_id],
            })
            .send()
            .await?;
        Self::handle_empty(response).await?;

        self.get_note(note_id).await
    }

    pub async fn create_attribute(
        &self,
        note_id: &str,
        attribute_type: AttributeType,
        name: &str,
        value: &str,
        is_inheritable: bool,
    ) -> EtapiResult<Attribute> {
        let response = self
            .request(Method::POST, &["attributes"])?
            .json(&CreateAttributeRequest {
                note_id,
                attribute_type,
                name,
                value,
                is_inheritable,
            })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn update_attribute(
        &self,
        attribute_id: &str,
        value: &str,
        is_inheritable: Option<bool>,
    ) -> EtapiResult<()> {
        let response = self
            .request(Method::PATCH, &["attributes", attribute_id])?
            .json(&UpdateAttributeRequest {
                value,
                is_inheritable,
            })
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    pub async fn delete_attribute(&self, attribute_id: &str) -> EtapiResult<()> {
        let response = self
            .request(Method::DELETE, &["attributes", attribute_id])?
            .send()
            .await?;
        Self::handle_empty(response).await
    }
}
