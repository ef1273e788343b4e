//! Normalizes epoch-second timestamp fields in JSON response bodies into
//! dates before application code sees them.
//!
//! ```no_run
//! use respnorm::{Node, normalize};
//!
//! let mut body = Node::from(serde_json::json!({ "created_at": 1700000000, "updated_at": 1700003600 }));
//! normalize(&mut body);
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod interceptor;
pub mod models;
pub mod node;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod timestamp;

pub use config::{NormalizerConfig, PairPolicy};
pub use error::NormalizeError;
pub use interceptor::{HttpEvent, HttpResponse, InterceptorChain, ResponseInterceptor, TimeTransformer};
pub use node::{Node, Object};
pub use normalizer::{NormalizeStats, Normalizer, normalize};
pub use timestamp::Timestamp;
