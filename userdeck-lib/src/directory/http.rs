use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    header::{ACCEPT, CONTENT_TYPE, COOKIE},
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    Error, Result,
    config::ApiConfig,
    directory::{DirectoryError, UserDirectory},
    identity::UserId,
    profile::{UpdatePayload, UserRecord},
};

/// Error body returned by the directory on failure
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// [`UserDirectory`] over HTTP. Requests carry the session cookie, if any.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    base_url: Url,
    client: Client,
    cookie: Option<String>,
    timeout: Duration,
}

impl HttpUserDirectory {
    pub fn new(api: &ApiConfig, cookie: Option<String>) -> Result<Self> {
        let base_url = Url::parse(&api.base_url).map_err(|err| Error::InvalidBaseUrl {
            url: api.base_url.clone(),
            reason: err.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: api.base_url.clone(),
                reason: "URL cannot have path segments".into(),
            });
        }

        let client = Client::builder()
            .timeout(api.request_timeout())
            .connect_timeout(api.connect_timeout())
            .build()
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;

        Ok(Self {
            base_url,
            client,
            cookie,
            timeout: api.request_timeout(),
        })
    }

    /// `{base}/users/{id}`, with `id` escaped as a single path segment
    pub(crate) fn user_url(&self, id: &UserId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(id.as_str());
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, DirectoryError> {
        let response = builder.send().await.map_err(|err| {
            error!(error = %err, url = ?err.url().map(Url::as_str), "Directory request failed");
            if err.is_timeout() {
                DirectoryError::Timeout(self.timeout)
            } else {
                DirectoryError::Transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(handle_error(response).await);
        }

        debug!(status = %response.status(), url = %response.url(), "Directory request succeeded");

        Ok(response)
    }
}

async fn handle_error(response: Response) -> DirectoryError {
    let status = response.status();

    let message = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
            .unwrap_or_default()
            .message,
        Err(_) => None,
    };

    error!(status = %status, message = ?message, "Directory returned an error");

    DirectoryError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn fetch(&self, id: &UserId) -> std::result::Result<UserRecord, DirectoryError> {
        let response = self
            .send(self.request(Method::GET, self.user_url(id)))
            .await?;

        response.json::<UserRecord>().await.map_err(|err| {
            error!(error = %err, "Failed to parse user record");
            DirectoryError::Decode(err.to_string())
        })
    }

    async fn replace(
        &self,
        id: &UserId,
        payload: &UpdatePayload,
    ) -> std::result::Result<(), DirectoryError> {
        self.send(self.request(Method::PUT, self.user_url(id)).json(payload)).await?;

        Ok(())
    }

    async fn remove(&self, id: &UserId) -> std::result::Result<(), DirectoryError> {
        self.send(self.request(Method::DELETE, self.user_url(id))).await?;

        Ok(())
    }
}
