//! Output handling for CLI
//!
//! - Command results: one JSON object on stdout
//! - Benchmark reports: stdout or a file
//! - UTF-8 only

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Runs `render` against `path` if given, otherwise against stdout
pub fn write_output<F>(path: Option<&Path>, render: F) -> CliResult<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            render(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            render(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}
