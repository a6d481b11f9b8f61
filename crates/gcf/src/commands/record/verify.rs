use clap::Args;
use gcf_binary::{BinaryRecord, RecordReader, RecordWriter};
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};
use tracing::info;
use walkdir::WalkDir;

use super::{SchemaName, SchemaVisitor};

/// Bytes per line of a hex dump
const DUMP_WIDTH: usize = 16;

#[derive(Args)]
pub struct VerifyArgs {
    /// Record layout of the input
    #[arg(short, long, value_enum)]
    schema: SchemaName,

    /// An input file
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with = "directory",
        required_unless_present = "directory"
    )]
    file: Option<PathBuf>,

    /// A directory whose files are verified one by one
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Print a hex diff of the original and re-encoded bytes on mismatch
    #[arg(long, default_value_t = false)]
    diff: bool,
}

/// Outcome of decoding a whole file and encoding the records again
struct Reencoded {
    records: usize,
    bytes: Vec<u8>,
}

struct Reencode<'a> {
    bytes: &'a [u8],
}

impl SchemaVisitor for Reencode<'_> {
    type Output = gcf_binary::error::Result<Reencoded>;

    fn visit<T: BinaryRecord + Debug>(self) -> Self::Output {
        let records = RecordReader::new(self.bytes).read_all::<T>()?;

        let mut writer = RecordWriter::with_capacity(self.bytes.len());
        for record in &records {
            writer.write(record)?;
        }

        Ok(Reencoded {
            records: records.len(),
            bytes: writer.finish(),
        })
    }
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(DUMP_WIDTH)
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "{:08x}  {}\n",
                i * DUMP_WIDTH,
                chunk.iter().map(|b| format!("{:02x}", b)).join(" ")
            )
        })
        .collect()
}

fn print_diff(original: &[u8], reencoded: &[u8]) {
    let old = hex_dump(original);
    let new = hex_dump(reencoded);
    let diff = TextDiff::from_lines(&old, &new);

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => print!("-{}", change.red()),
            ChangeTag::Insert => print!("+{}", change.green()),
            ChangeTag::Equal => {}
        }
    }
}

impl VerifyArgs {
    fn verify_file(&self, path: &Path) -> Result<usize> {
        let original = std::fs::read(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;

        let reencoded = self
            .schema
            .visit(Reencode { bytes: &original })
            .context(format!("decoding {}", path.display()))?;

        if reencoded.bytes != original {
            if self.diff {
                print_diff(&original, &reencoded.bytes);
            }

            let offset = original
                .iter()
                .zip(&reencoded.bytes)
                .position(|(a, b)| a != b)
                .unwrap_or(original.len().min(reencoded.bytes.len()));
            return Err(miette!(
                "{}: re-encoded bytes differ from offset {} ({} vs {} bytes)",
                path.display(),
                offset,
                original.len(),
                reencoded.bytes.len()
            ));
        }

        Ok(reencoded.records)
    }

    fn verify_directory(&self, directory: &Path) -> Result<()> {
        let files = WalkDir::new(directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let mut failed = 0;
        for file in &files {
            match self.verify_file(file.path()) {
                Ok(records) => {
                    println!("✅ {} ({} records)", file.path().display().green(), records)
                }
                Err(err) => {
                    failed += 1;
                    println!("❌ {}", file.path().display().red());
                    println!("{:?}", err);
                }
            }
        }

        info!("{} of {} files verified", files.len() - failed, files.len());
        if failed > 0 {
            return Err(miette!("{} of {} files failed", failed, files.len()));
        }
        Ok(())
    }

    pub fn handle(&self) -> Result<()> {
        match (&self.file, &self.directory) {
            (Some(file), _) => {
                let records = self.verify_file(file)?;
                println!("✅ {} ({} records)", file.display().green(), records);
                Ok(())
            }
            (None, Some(directory)) => self.verify_directory(directory),
            (None, None) => Err(miette!("either --file or --directory is required")),
        }
    }
}
