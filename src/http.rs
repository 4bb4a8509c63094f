use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    multipart::{Form, Part},
    Body, Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::error::{Error, Result};
use crate::model::{Credential, Registry};

/// Lazily read chart archive returned by a download. Dropping it releases
/// the underlying connection.
pub type ChartContent = Pin<Box<dyn AsyncRead + Send>>;

/// Chart archive handed to an upload.
pub type ChartUpload = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// The HTTP operations the adapters need. Every method maps a non-2xx
/// response to [`Error::Remote`] carrying the status and the response text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the whole body.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// GET `url` and hand the body back unread.
    async fn open(&self, url: &str) -> Result<ChartContent>;

    /// POST `content` as the single multipart file field `field`.
    async fn post_file(
        &self,
        url: &str,
        field: &str,
        file_name: &str,
        content: ChartUpload,
    ) -> Result<()>;

    async fn delete(&self, url: &str) -> Result<()>;
}

/// [`HttpClient`] backed by reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    credential: Option<Credential>,
}

impl ReqwestHttpClient {
    pub fn new(insecure: bool, credential: Option<Credential>) -> Result<Self> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        log::debug!("{}: {}", USER_AGENT.as_str(), user_agent);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(|e| Error::transport("", e))?,
        );

        if insecure {
            log::warn!("TLS certificate verification is disabled");
        }
        let client = ClientBuilder::new()
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| Error::transport("", e))?;
        Ok(Self { client, credential })
    }

    pub fn for_registry(registry: &Registry) -> Result<Self> {
        Self::new(registry.insecure, registry.credential.clone())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credential {
            Some(credential) => {
                request.basic_auth(&credential.username, Some(&credential.password))
            }
            None => request,
        }
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response> {
        log::debug!("Requesting {}", url);
        let response = request.send().await.map_err(|e| Error::transport(url, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(remote_error(url, status, read_error_body(url, response).await))
    }
}

/// Drains an error response. A body that cannot be read is logged and
/// replaced by an empty one so the status still reaches the caller.
async fn read_error_body(url: &str, response: Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(error) => {
            log::warn!("Failed to read error response from {}: {}", url, error);
            String::new()
        }
    }
}

fn remote_error(url: &str, status: StatusCode, body: String) -> Error {
    Error::Remote {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    }
}

/// Maps a response status to `Ok` for 2xx and [`Error::Remote`] otherwise.
pub(crate) fn ensure_success(url: &str, status: StatusCode, body: String) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(remote_error(url, status, body))
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url, self.request(Method::GET, url)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e))?;
        Ok(body.to_vec())
    }

    async fn open(&self, url: &str) -> Result<ChartContent> {
        // Archives may be served by storage that negotiates on Accept.
        let request = self.request(Method::GET, url).header(ACCEPT, "*/*");
        let response = self.send(url, request).await?;
        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Ok(Box::pin(StreamReader::new(stream)))
    }

    async fn post_file(
        &self,
        url: &str,
        field: &str,
        file_name: &str,
        content: ChartUpload,
    ) -> Result<()> {
        let part = Part::stream(Body::wrap_stream(ReaderStream::new(content)))
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::transport(url, e))?;
        let form = Form::new().part(field.to_string(), part);

        let response = self
            .request(Method::POST, url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;
        let status = response.status();
        if status.is_success() {
            response
                .bytes()
                .await
                .map_err(|e| Error::transport(url, e))?;
            return Ok(());
        }
        ensure_success(url, status, read_error_body(url, response).await)
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let response = self.send(url, self.request(Method::DELETE, url)).await?;
        response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e))?;
        Ok(())
    }
}

/// GETs `url` and decodes the body as `T`.
pub(crate) async fn get_json<C, T>(client: &C, url: &str) -> Result<T>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let body = client.get(url).await?;
    serde_json::from_slice(&body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })
}
