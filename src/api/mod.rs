//! HTTP client wrapper shared by the domain services.
//!
//! Every request carries the stored bearer token, the configured base URL and
//! JSON headers. A 401 from any endpoint removes the stored token before the
//! error is returned, so the caller only has to switch to the login screen.

pub mod assignments;
pub mod auth;
pub mod caregivers;
pub mod elderly;

use crate::error::ApiError;
use crate::session::Session;
use crate::download::attachment_name;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Messages used when the backend answers 404 or 400 for a given call.
#[derive(Clone, Copy, Debug)]
pub struct ErrorText {
    pub not_found: &'static str,
    pub bad_request: &'static str,
}

impl ErrorText {
    pub const fn new(not_found: &'static str, bad_request: &'static str) -> ErrorText {
        ErrorText {
            not_found,
            bad_request,
        }
    }
}

pub const GENERIC: ErrorText = ErrorText::new("Resource not found", "Request failed");

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// A downloaded body and the file name the server suggested for it.
#[derive(Clone, Debug)]
pub struct Download {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> ApiClient {
        ApiClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request with JSON headers and no credentials (login, register).
    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Request carrying the stored token. Fails before any I/O when signed out.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.session.token().ok_or(ApiError::Unauthorized)?;
        Ok(self
            .public(method, path)
            .header(AUTHORIZATION, format!("Bearer {}", token)))
    }

    async fn execute(&self, req: RequestBuilder, text: ErrorText) -> Result<Response, ApiError> {
        let res = req.send().await.map_err(ApiError::Connection)?;
        let status = res.status();
        debug!("{} {}", status.as_u16(), res.url().path());

        if status.is_success() {
            return Ok(res);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("401 from {}; clearing stored token", res.url().path());
                if let Err(err) = self.session.clear_token() {
                    warn!("failed to clear stored token: {}", err);
                }
                Err(ApiError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(text.not_found.to_string())),
            StatusCode::BAD_REQUEST => {
                let detail = read_detail(res).await;
                Err(ApiError::BadRequest(
                    detail.unwrap_or_else(|| text.bad_request.to_string()),
                ))
            }
            _ => Err(ApiError::Http { status }),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        text: ErrorText,
    ) -> Result<T, ApiError> {
        let req = self.authed(Method::GET, path)?;
        let res = self.execute(req, text).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        text: ErrorText,
    ) -> Result<T, ApiError> {
        let req = self.authed(Method::POST, path)?.json(body);
        let res = self.execute(req, text).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        text: ErrorText,
    ) -> Result<T, ApiError> {
        let req = self.authed(Method::PUT, path)?.json(body);
        let res = self.execute(req, text).await?;
        Ok(res.json::<T>().await?)
    }

    /// DELETE; the response body is a status message and is discarded.
    pub async fn delete(&self, path: &str, text: ErrorText) -> Result<(), ApiError> {
        let req = self.authed(Method::DELETE, path)?;
        self.execute(req, text).await?;
        Ok(())
    }

    pub async fn get_bytes(
        &self,
        path: &str,
        accept: &str,
        text: ErrorText,
    ) -> Result<Download, ApiError> {
        let req = self.authed(Method::GET, path)?.header(ACCEPT, accept);
        let res = self.execute(req, text).await?;
        let file_name = res
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_name);
        Ok(Download {
            file_name,
            bytes: res.bytes().await?.to_vec(),
        })
    }

    /// Unauthenticated POST; any failure surfaces the backend `detail`.
    pub async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &'static str,
    ) -> Result<T, ApiError> {
        let res = self
            .public(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Connection)?;
        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }
        let detail = read_detail(res).await;
        Err(ApiError::BadRequest(
            detail.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

async fn read_detail(res: Response) -> Option<String> {
    let body = res.json::<ErrorBody>().await.ok()?;
    match body.detail? {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fake;
