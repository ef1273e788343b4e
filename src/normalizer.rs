//! Rewrites epoch-second timestamp fields into dates, in place.
//!
//! The walk is pre-order and depth-first. On each object the recognized
//! fields are rewritten first, then every property is descended into. Values
//! already tagged [`Node::Date`] are never read back as numbers, so running
//! the pass twice is harmless.

use crate::config::{NormalizerConfig, PairPolicy};
use crate::error::NormalizeError;
use crate::node::{Node, Object};
use crate::timestamp::Timestamp;
use tracing::trace;

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const LAST_WORKOUT: &str = "last_workout";

/// Counters gathered during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub objects_visited: usize,
    pub fields_converted: usize,
    pub invalid_dates: usize,
}

impl NormalizeStats {
    pub fn merge(self, other: Self) -> Self {
        Self {
            objects_visited: self.objects_visited + other.objects_visited,
            fields_converted: self.fields_converted + other.fields_converted,
            invalid_dates: self.invalid_dates + other.invalid_dates,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes a decoded response body.
    ///
    /// Falsy bodies are left alone. A top-level array has each element
    /// handled on its own; anything else is handled as a single node.
    pub fn normalize(&self, body: &mut Node) -> Result<NormalizeStats, NormalizeError> {
        let mut walk = Walk {
            config: &self.config,
            stats: NormalizeStats::default(),
        };

        if !body.is_truthy() {
            return Ok(walk.stats);
        }

        match body {
            Node::Array(items) => walk.visit_items(items)?,
            node => walk.visit(node)?,
        }

        Ok(walk.stats)
    }
}

/// Convenience wrapper with the default configuration.
pub fn normalize(body: &mut Node) -> NormalizeStats {
    // lenient walks never fail
    Normalizer::default().normalize(body).unwrap_or_default()
}

struct Walk<'a> {
    config: &'a NormalizerConfig,
    stats: NormalizeStats,
}

/// Outcome of reading a timestamp field's raw value.
enum Coerced {
    /// Already a date, nothing to do.
    Unchanged,
    Date(Timestamp),
}

impl Walk<'_> {
    fn visit(&mut self, node: &mut Node) -> Result<(), NormalizeError> {
        match node {
            Node::Object(obj) => self.visit_object(obj),
            Node::Array(items) => self.visit_items(items),
            _ => Ok(()),
        }
    }

    fn visit_items(&mut self, items: &mut [Node]) -> Result<(), NormalizeError> {
        for (index, item) in items.iter_mut().enumerate() {
            self.visit(item)
                .map_err(|e| e.within(&index.to_string()))?;
        }
        Ok(())
    }

    fn visit_object(&mut self, obj: &mut Object) -> Result<(), NormalizeError> {
        self.stats.objects_visited += 1;
        self.rewrite_fields(obj)?;

        for (key, child) in obj.iter_mut() {
            let descended = match child {
                Node::Date(_) => continue,
                Node::Array(items) => self.visit_items(items),
                Node::Object(inner) => self.visit_object(inner),
                _ => continue,
            };
            descended.map_err(|e| e.within(key))?;
        }
        Ok(())
    }

    fn rewrite_fields(&mut self, obj: &mut Object) -> Result<(), NormalizeError> {
        if obj.contains_key(CREATED_AT) || obj.contains_key(UPDATED_AT) {
            for field in [CREATED_AT, UPDATED_AT] {
                if self.config.pair_policy == PairPolicy::PresentOnly && !obj.contains_key(field) {
                    continue;
                }
                self.convert(obj, field)?;
            }
        } else if obj.get(LAST_WORKOUT).is_some_and(Node::is_truthy) {
            self.convert(obj, LAST_WORKOUT)?;
        }
        Ok(())
    }

    fn convert(&mut self, obj: &mut Object, field: &str) -> Result<(), NormalizeError> {
        let ts = match self.coerce(obj.get(field)) {
            Ok(Coerced::Unchanged) => return Ok(()),
            Ok(Coerced::Date(ts)) => ts,
            Err(found) => return Err(NormalizeError::invalid_timestamp(field, found)),
        };

        trace!(field, date = %ts, "converted timestamp");
        self.stats.fields_converted += 1;
        if !ts.is_valid() {
            self.stats.invalid_dates += 1;
        }
        obj.insert(field, Node::Date(ts));
        Ok(())
    }

    /// Interprets a raw field value as epoch seconds.
    ///
    /// Only numbers are read as timestamps. In lenient mode anything else
    /// (`null`, booleans, strings, containers, a missing field) gives an
    /// invalid date. Strict mode rejects those instead, along with numbers
    /// that fall outside the representable range; the error carries what was
    /// found.
    fn coerce(&self, raw: Option<&Node>) -> Result<Coerced, &'static str> {
        let strict = self.config.strict;
        let ts = match raw {
            Some(Node::Date(_)) => return Ok(Coerced::Unchanged),
            Some(Node::Number(n)) => {
                let ts = n
                    .as_f64()
                    .map_or(Timestamp::Invalid, Timestamp::from_epoch_seconds);
                if strict && !ts.is_valid() {
                    return Err("out-of-range number");
                }
                ts
            }
            Some(other) if strict => return Err(other.kind()),
            None if strict => return Err("missing field"),
            Some(_) | None => Timestamp::Invalid,
        };
        Ok(Coerced::Date(ts))
    }
}
