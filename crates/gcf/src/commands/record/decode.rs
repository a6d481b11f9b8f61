use clap::{Args, ValueEnum};
use gcf_binary::{BinaryRecord, Record, RecordReader};
use miette::{Context, IntoDiagnostic, Result};
use std::{fmt::Debug, path::PathBuf};
use tracing::{debug, info};

use super::{SchemaName, SchemaVisitor};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Format {
    /// Field names and values as JSON
    #[default]
    Json,
    /// The declared record type's debug output
    Debug,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Record layout of the input
    #[arg(short, long, value_enum)]
    schema: SchemaName,

    /// An input file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Decode consecutive records until the input is exhausted
    #[arg(long, default_value_t = false)]
    all: bool,
}

struct DecodeTyped<'a> {
    bytes: &'a [u8],
    all: bool,
}

impl SchemaVisitor for DecodeTyped<'_> {
    type Output = gcf_binary::error::Result<Vec<String>>;

    fn visit<T: BinaryRecord + Debug>(self) -> Self::Output {
        let mut reader = RecordReader::new(self.bytes);
        let records = if self.all {
            reader.read_all::<T>()?
        } else {
            vec![reader.read::<T>()?]
        };
        Ok(records.iter().map(|r| format!("{:#?}", r)).collect())
    }
}

impl DecodeArgs {
    fn decode_dynamic(&self, bytes: &[u8]) -> Result<Vec<Record>> {
        let descriptor = self.schema.descriptor()?;
        let mut reader = RecordReader::new(bytes);

        let mut records = vec![reader.read_dynamic(&descriptor)?];
        while self.all && !reader.is_exhausted() {
            debug!("record {} at offset {}", records.len(), reader.position());
            records.push(reader.read_dynamic(&descriptor)?);
        }

        if !reader.is_exhausted() {
            info!("{} trailing bytes ignored", reader.remaining());
        }
        Ok(records)
    }

    pub fn handle(&self) -> Result<()> {
        let bytes = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        match self.format {
            Format::Json => {
                let records = self.decode_dynamic(&bytes)?;
                let json = if self.all {
                    serde_json::to_string_pretty(&records)
                } else {
                    serde_json::to_string_pretty(&records[0])
                }
                .into_diagnostic()?;
                println!("{}", json);
            }
            Format::Debug => {
                let records = self.schema.visit(DecodeTyped {
                    bytes: &bytes,
                    all: self.all,
                })?;
                for record in records {
                    println!("{}", record);
                }
            }
        }

        Ok(())
    }
}
