use super::config::Config;
use super::error::{ApiError, Error, Result};
use super::request::{Pagination, RequestOption, Response};
use colored_json::to_colored_json_auto;
use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, trace, Level};
use url::Url;

const API_PATH: &str = "api/v4/";

pub struct Client<'a> {
    http_client: reqwest::Client,
    base_url: Url,
    config: &'a Config,
}

struct RawResponse {
    status: StatusCode,
    pagination: Pagination,
    url: Url,
    body: Vec<u8>,
}

impl<'a> Client<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().default_headers(Self::default_headers());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: api_base_url(config.host())?,
            config,
        })
    }

    fn default_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))),
        );

        headers
    }

    /// Resolves `path` against the API base and appends `segments`, each
    /// percent-encoded as a single path segment. Empty, `.` and `..`
    /// segments cannot survive url normalization and are rejected.
    pub fn endpoint<I>(&self, path: &str, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let segments: Vec<I::Item> = segments.into_iter().collect();

        if let Some(invalid) = segments
            .iter()
            .map(AsRef::as_ref)
            .find(|s| matches!(*s, "" | "." | ".."))
        {
            return Err(Error::InvalidKey(invalid.to_owned()));
        }

        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.base_url.clone()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()))
            .extend(segments);

        Ok(url)
    }

    /// Builds a request. `opt` goes into the query string for GET and
    /// DELETE and into a JSON body for everything else.
    pub fn new_request<O>(
        &self,
        method: Method,
        url: Url,
        opt: Option<&O>,
        options: &[RequestOption],
    ) -> Result<reqwest::Request>
    where
        O: Serialize + ?Sized,
    {
        let mut builder = self
            .http_client
            .request(method.clone(), url.clone())
            .bearer_auth(self.config.auth_token());

        if let Some(opt) = opt {
            if method == Method::GET || method == Method::DELETE {
                builder = builder.query(opt);
            } else {
                if tracing::enabled!(Level::TRACE) {
                    #[cfg(windows)]
                    let _enabled = colored_json::enable_ansi_support();

                    if let Ok(body) =
                        serde_json::to_value(opt).and_then(|v| to_colored_json_auto(&v))
                    {
                        trace!("{method} {url}\n{body}");
                    }
                }

                builder = builder.json(opt);
            }
        }

        options
            .iter()
            .fold(builder, |builder, option| option.apply(builder))
            .build()
            .map_err(Error::from)
    }

    pub async fn execute<R>(&self, request: reqwest::Request) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let raw = self.send(request).await?;

        let data = serde_json::from_slice(&raw.body).map_err(|source| Error::Decode {
            url: raw.url,
            source,
        })?;

        Ok(Response {
            status: raw.status,
            pagination: raw.pagination,
            data,
        })
    }

    /// Like [`Client::execute`] for endpoints that answer without a body.
    pub async fn execute_empty(&self, request: reqwest::Request) -> Result<Response<()>> {
        let raw = self.send(request).await?;

        Ok(Response {
            status: raw.status,
            pagination: raw.pagination,
            data: (),
        })
    }

    pub async fn get<R>(&self, url: Url, options: &[RequestOption]) -> Result<Response<R>>
    where
        R: DeserializeOwned,
    {
        let request = self.new_request(Method::GET, url, None::<&()>, options)?;

        self.execute(request).await
    }

    async fn send(&self, request: reqwest::Request) -> Result<RawResponse> {
        let method = request.method().clone();
        let url = request.url().clone();

        info!("{method} {url}");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let pagination = Pagination::from_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        debug!("{method} {url} -> {status}");

        if !status.is_success() {
            return Err(Error::from_status(ApiError {
                method,
                url,
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(RawResponse {
            status,
            pagination,
            url,
            body,
        })
    }
}

/// `https://gitlab.example.com` becomes `https://gitlab.example.com/api/v4/`.
pub fn api_base_url(host: &Url) -> Result<Url> {
    if host.cannot_be_a_base() {
        return Err(Error::CannotBeABase(host.clone()));
    }

    let mut base = host.clone();
    base.set_query(None);
    base.set_fragment(None);

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    if base.path().ends_with(API_PATH) {
        return Ok(base);
    }

    base.join(API_PATH).map_err(Error::from)
}
