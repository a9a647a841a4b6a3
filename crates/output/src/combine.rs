//! Stitching per-rank output files back together

// crate modules
use crate::error::{Error, Result};
use crate::writer::Format;

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

// external crates
use log::info;

/// Concatenate rank files into one stream
///
/// The first file is copied whole; subsequent files contribute their
/// payload with the duplicate header skipped. Rank outputs are not
/// interleaved in time, matching how the ranks split the simulation.
pub fn combine_files<P: AsRef<Path>>(
    rank_paths: &[P],
    target: impl AsRef<Path>,
    format: Format,
) -> Result<()> {
    let first = rank_paths.first().ok_or(Error::NothingToCombine)?;
    let target_file = File::create(target.as_ref())?;
    let mut writer = BufWriter::new(target_file);

    std::io::copy(&mut File::open(first.as_ref())?, &mut writer)?;
    for path in &rank_paths[1..] {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        skip_header(&mut reader, format)?;
        std::io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    info!(
        "combined {} rank files into {}",
        rank_paths.len(),
        target.as_ref().display()
    );
    Ok(())
}

fn skip_header(reader: &mut BufReader<File>, format: Format) -> Result<()> {
    match format {
        Format::VariableBinary => {
            // magic + version + flags
            let mut header = [0u8; 12];
            reader.read_exact(&mut header)?;
        }
        Format::VariableAscii => {
            let mut line = String::new();
            for _ in 0..3 {
                line.clear();
                reader.read_line(&mut line)?;
            }
        }
        _ => {}
    }
    Ok(())
}
