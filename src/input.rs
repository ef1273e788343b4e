use crate::interceptor::{HttpEvent, HttpResponse};
use crate::node::Node;
use anyhow::{Context, Result};
use memchr::memchr_iter;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// The whole input is a single response body.
    Json,
    /// One response body per line.
    Jsonl,
    /// One captured HTTP event per line.
    Capture,
}

impl InputFormat {
    fn line_oriented(self) -> bool {
        !matches!(self, InputFormat::Json)
    }
}

/// Raw input bytes, memory-mapped for files and buffered for stdin.
pub enum Source {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Source {
    /// Opens `path`, or reads stdin when it is `-`.
    pub fn open(path: &str) -> Result<Self> {
        if path == "-" {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            return Ok(Source::Buffered(buf));
        }

        let file = File::open(path).with_context(|| format!("opening {path}"))?;
        if file.metadata()?.len() == 0 {
            // zero-length files cannot be mapped on every platform
            return Ok(Source::Buffered(Vec::new()));
        }
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mapping {path}"))?;
        Ok(Source::Mapped(mmap))
    }
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => &mmap[..],
            Source::Buffered(buf) => &buf[..],
        }
    }
}

/// A run of whole lines. `first_line` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub first_line: usize,
    pub bytes: &'a [u8],
}

/// One decoded input item.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub line: usize,
    pub event: HttpEvent,
}

impl Record {
    /// What gets written out: the bare body for body formats, the whole event
    /// for captures.
    pub fn into_output(self, format: InputFormat) -> Result<Option<Node>, serde_json::Error> {
        match format {
            InputFormat::Capture => serde_json::to_value(&self.event).map(|v| Some(Node::from(v))),
            InputFormat::Json | InputFormat::Jsonl => Ok(self.event.into_response_body()),
        }
    }
}

/// Splits input into batches of at most `batch_size` lines. Non
/// line-oriented formats yield a single batch.
pub fn split_batches(bytes: &[u8], format: InputFormat, batch_size: usize) -> Vec<Batch<'_>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    if !format.line_oriented() {
        return vec![Batch { first_line: 1, bytes }];
    }

    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut start = 0;
    let mut first_line = 1;
    let mut lines = 0;

    for nl in memchr_iter(b'\n', bytes) {
        lines += 1;
        if lines == batch_size {
            batches.push(Batch {
                first_line,
                bytes: &bytes[start..=nl],
            });
            start = nl + 1;
            first_line += lines;
            lines = 0;
        }
    }
    if start < bytes.len() {
        batches.push(Batch {
            first_line,
            bytes: &bytes[start..],
        });
    }
    batches
}

/// Decodes every record in a batch. Malformed items are logged and counted,
/// never fatal.
pub fn parse_batch(format: InputFormat, batch: Batch<'_>) -> (Vec<Record>, usize) {
    if !format.line_oriented() {
        return match parse_item(format, batch.bytes) {
            Ok(Some(event)) => (vec![Record { line: batch.first_line, event }], 0),
            Ok(None) => (Vec::new(), 0),
            Err(e) => {
                warn!("skipping input: {:#}", e);
                (Vec::new(), 1)
            }
        };
    }

    let mut records = Vec::with_capacity(batch.bytes.len() / 128);
    let mut failures = 0;
    let mut start = 0;
    let mut line = batch.first_line;

    let mut take = |bytes: &[u8], line: usize| match parse_item(format, bytes) {
        Ok(Some(event)) => records.push(Record { line, event }),
        Ok(None) => {}
        Err(e) => {
            warn!(line, "skipping input line: {:#}", e);
            failures += 1;
        }
    };

    for nl in memchr_iter(b'\n', batch.bytes) {
        take(&batch.bytes[start..nl], line);
        start = nl + 1;
        line += 1;
    }
    if start < batch.bytes.len() {
        take(&batch.bytes[start..], line);
    }

    (records, failures)
}

fn parse_item(format: InputFormat, bytes: &[u8]) -> Result<Option<HttpEvent>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let event = match format {
        InputFormat::Capture => serde_json::from_slice(bytes).context("decoding captured event")?,
        InputFormat::Json | InputFormat::Jsonl => {
            let body: Node = serde_json::from_slice(bytes).context("decoding body")?;
            HttpEvent::Response(HttpResponse::ok(body))
        }
    };
    Ok(Some(event))
}
