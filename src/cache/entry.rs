use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Headers that only describe a single connection and must not be replayed.
static HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::HOST,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub(crate) fn is_forwardable(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(name) && name.as_str() != "keep-alive"
}

/// A request intercepted on its way to the backend.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A bodiless GET, as issued for precached assets.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Entries are keyed by the full request URL, query string included.
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Requests carrying credentials may be answered per user.
    pub fn has_credentials(&self) -> bool {
        self.headers.contains_key(header::COOKIE) || self.headers.contains_key(header::AUTHORIZATION)
    }
}

/// A fully buffered response, as stored in a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(serialize_with = "encode_body", deserialize_with = "decode_body")]
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Copies the replayable headers of a live response.
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let headers = headers
            .iter()
            .filter(|(name, _)| is_forwardable(name))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status: status.as_u16(),
            headers,
            body: body.to_vec(),
        }
    }

    /// Only plain `200 OK` responses may be persisted.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }

    /// Whether the response may be replayed to any client of the proxy.
    ///
    /// Responses setting cookies or marked `private` / `no-store` belong to
    /// one client only.
    pub fn is_shareable(&self) -> bool {
        !self.headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case(header::SET_COOKIE.as_str())
                || (name.eq_ignore_ascii_case(header::CACHE_CONTROL.as_str())
                    && value.split(',').any(|directive| {
                        let directive = directive.trim().to_ascii_lowercase();
                        directive == "no-store"
                            || directive == "private"
                            || directive.starts_with("private=")
                    }))
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) else {
                tracing::debug!("Dropping unparsable cached header {}", name);
                continue;
            };
            headers.append(name, value);
        }
        response
    }
}

fn encode_body<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(body))
}

fn decode_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}
