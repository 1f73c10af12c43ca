use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

type Modifier = dyn Fn(RequestBuilder) -> RequestBuilder + Send + Sync;

/// Per-call customization of an outgoing request, applied in order right
/// before the request is built.
pub struct RequestOption(Box<Modifier>);

impl RequestOption {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());

        Self::new(move |builder| builder.header(name.as_str(), value.as_str()))
    }

    /// Runs the request as another user (admin tokens only).
    pub fn sudo(user: impl Into<String>) -> Self {
        Self::header("Sudo", user)
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::new(move |builder| builder.timeout(timeout))
    }

    pub(crate) fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        (self.0)(builder)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption(..)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListOptions {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

/// GitLab's offset pagination headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

impl Pagination {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            page: header_value(headers, "x-page"),
            per_page: header_value(headers, "x-per-page"),
            next_page: header_value(headers, "x-next-page"),
            prev_page: header_value(headers, "x-prev-page"),
            total: header_value(headers, "x-total"),
            total_pages: header_value(headers, "x-total-pages"),
        }
    }
}

fn header_value<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

#[derive(Debug)]
pub struct Response<T> {
    pub status: StatusCode,
    pub pagination: Pagination,
    pub data: T,
}

impl<T> Response<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Response<Vec<T>>> for Page<T> {
    fn from(response: Response<Vec<T>>) -> Self {
        Self {
            items: response.data,
            pagination: response.pagination,
        }
    }
}

/// GitLab sends `null` for unset collections and flags; decode it as the
/// field's default. Pair with `#[serde(default)]` so a missing field works too.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
