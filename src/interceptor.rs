//! Response interception over an HTTP client's event stream.
//!
//! A request produces a sequence of events; only the final
//! [`HttpEvent::Response`] carries a complete body, and only that event is
//! handed to the normalizer.

use crate::config::NormalizerConfig;
use crate::error::NormalizeError;
use crate::node::Node;
use crate::normalizer::{NormalizeStats, Normalizer};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HttpEvent {
    Sent,
    UploadProgress {
        loaded: u64,
        total: Option<u64>,
    },
    ResponseHeader {
        status: u16,
        url: Option<String>,
    },
    DownloadProgress {
        loaded: u64,
        total: Option<u64>,
    },
    Response(HttpResponse),
    User {
        payload: Node,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: Option<Node>,
}

impl HttpResponse {
    pub fn ok(body: Node) -> Self {
        Self {
            status: 200,
            url: None,
            body: Some(body),
        }
    }
}

impl HttpEvent {
    pub fn response_body(&self) -> Option<&Node> {
        match self {
            HttpEvent::Response(resp) => resp.body.as_ref(),
            _ => None,
        }
    }

    pub fn into_response_body(self) -> Option<Node> {
        match self {
            HttpEvent::Response(resp) => resp.body,
            _ => None,
        }
    }
}

/// Hook run on every event flowing back from the HTTP client.
pub trait ResponseInterceptor {
    fn intercept(&self, event: &mut HttpEvent) -> Result<NormalizeStats, NormalizeError>;
}

/// Converts epoch-second timestamp fields on completed responses into dates.
#[derive(Debug, Clone, Default)]
pub struct TimeTransformer {
    normalizer: Normalizer,
}

impl TimeTransformer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config),
        }
    }
}

impl ResponseInterceptor for TimeTransformer {
    fn intercept(&self, event: &mut HttpEvent) -> Result<NormalizeStats, NormalizeError> {
        let HttpEvent::Response(resp) = event else {
            return Ok(NormalizeStats::default());
        };
        let Some(body) = resp.body.as_mut() else {
            return Ok(NormalizeStats::default());
        };

        let stats = self.normalizer.normalize(body)?;
        debug!(
            status = resp.status,
            url = resp.url.as_deref().unwrap_or("-"),
            converted = stats.fields_converted,
            invalid = stats.invalid_dates,
            "normalized response body"
        );
        Ok(stats)
    }
}

/// Interceptors applied in registration order. The first error stops the
/// chain.
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn ResponseInterceptor + Send + Sync>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, interceptor: impl ResponseInterceptor + Send + Sync + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn run(&self, event: &mut HttpEvent) -> Result<NormalizeStats, NormalizeError> {
        let mut total = NormalizeStats::default();
        for interceptor in &self.interceptors {
            total = total.merge(interceptor.intercept(event)?);
        }
        Ok(total)
    }
}
