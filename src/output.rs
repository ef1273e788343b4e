use crate::node::Node;
use anyhow::{Result, anyhow};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub enum Writer {
    Stdout(Box<dyn Write + Send>),
    JsonFile(BufWriter<File>, bool), // bool tracks if we've written the opening bracket
    JsonlFile(BufWriter<File>),
}

impl Writer {
    pub fn write_batch(&mut self, values: &[Node]) -> Result<()> {
        match self {
            Writer::Stdout(writer) => {
                for value in values {
                    serde_json::to_writer_pretty(&mut *writer, value)?;
                    writeln!(writer)?;
                }
            }
            Writer::JsonFile(writer, is_first) => {
                for value in values {
                    if *is_first {
                        write!(writer, "[")?;
                        *is_first = false;
                    } else {
                        write!(writer, ",")?;
                    }
                    let serialized = serde_json::to_string_pretty(value)?;
                    write!(writer, "\n{}", serialized)?;
                }
            }
            Writer::JsonlFile(writer) => {
                for value in values {
                    serde_json::to_writer(&mut *writer, value)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        match self {
            Writer::JsonFile(ref mut writer, is_first) => {
                // an empty run still produces a valid document
                if is_first {
                    write!(writer, "[")?;
                }
                writeln!(writer, "\n]")?;
                writer.flush()?;
            }
            Writer::JsonlFile(ref mut writer) => {
                writer.flush()?;
            }
            Writer::Stdout(ref mut writer) => {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

pub fn create_writer(output_arg: &str) -> Result<Writer> {
    match output_arg {
        "stdout" | "json" => Ok(Writer::Stdout(Box::new(io::stdout()))),
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            let file = create_file(path)?;
            Ok(Writer::JsonlFile(BufWriter::new(file)))
        }
        path if path.ends_with(".json") || looks_like_path(path) => {
            let file = create_file(path)?;
            Ok(Writer::JsonFile(BufWriter::new(file), true))
        }
        _ => Err(anyhow!(
            "Unknown output format: {}. Use 'stdout', 'json', or a file path",
            output_arg
        )),
    }
}

fn looks_like_path(arg: &str) -> bool {
    arg.contains('/') || arg.contains('\\') || arg.contains('.')
}

fn create_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use serde_json::{Value, json};

    #[test]
    fn json_file_is_one_array_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/normalized.json");
        let path = path.to_str().unwrap();

        let mut writer = create_writer(path).unwrap();
        writer.write_batch(&[Node::from(json!({ "id": 1 }))]).unwrap();
        writer
            .write_batch(&[
                Node::from(json!({ "id": 2 })),
                Node::Date(Timestamp::from_epoch_seconds(0.0)),
            ])
            .unwrap();
        writer.finish().unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!([{ "id": 1 }, { "id": 2 }, "1970-01-01T00:00:00.000Z"])
        );
    }

    #[test]
    fn empty_json_file_is_still_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        let path = path.to_str().unwrap();

        create_writer(path).unwrap().finish().unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, json!([]));
    }

    #[test]
    fn jsonl_writes_one_value_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normalized.jsonl");
        let path = path.to_str().unwrap();

        let mut writer = create_writer(path).unwrap();
        writer
            .write_batch(&[Node::from(json!({ "a": 1 })), Node::from(json!([true]))])
            .unwrap();
        writer.finish().unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "{\"a\":1}\n[true]\n");
    }

    #[test]
    fn bare_word_is_rejected() {
        assert!(create_writer("yaml").is_err());
    }
}
