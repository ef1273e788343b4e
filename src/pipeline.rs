//! Per-batch work of the command-line tool: decode, intercept, check, and
//! collect what gets written.

use crate::input::{self, Batch, InputFormat};
use crate::interceptor::InterceptorChain;
use crate::models::ResourceKind;
use crate::node::Node;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Values handed to the writer.
    pub records: usize,
    pub converted: usize,
    pub failures: usize,
}

impl BatchReport {
    pub fn merge(self, other: Self) -> Self {
        Self {
            records: self.records + other.records,
            converted: self.converted + other.converted,
            failures: self.failures + other.failures,
        }
    }
}

/// Runs one batch through the chain.
///
/// A record that fails normalization is dropped. A record whose body does
/// not decode as `schema` is still written but counted as a failure.
pub fn process_batch(
    format: InputFormat,
    schema: Option<ResourceKind>,
    chain: &InterceptorChain,
    batch: Batch<'_>,
) -> (Vec<Node>, BatchReport) {
    let (records, mut failures) = input::parse_batch(format, batch);
    let mut converted = 0;
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        match chain.run(&mut record.event) {
            Ok(stats) => converted += stats.fields_converted,
            Err(e) => {
                warn!(line = record.line, "normalization failed: {}", e);
                failures += 1;
                continue;
            }
        }
        if let (Some(kind), Some(body)) = (schema, record.event.response_body()) {
            if let Err(e) = kind.check(body) {
                warn!(line = record.line, "body does not match {:?}: {}", kind, e);
                failures += 1;
            }
        }

        let line = record.line;
        match record.into_output(format) {
            Ok(Some(value)) => out.push(value),
            Ok(None) => {}
            Err(e) => {
                warn!(line, "cannot encode output: {}", e);
                failures += 1;
            }
        }
    }

    let report = BatchReport {
        records: out.len(),
        converted,
        failures,
    };
    (out, report)
}
