//! Interaction stream writers

// crate modules
use crate::error::Result;
use crate::flags::{pack_log, WriteFlags};
use crate::{MAGIC, VERSION};

// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// external crates
use gray_physics::Interaction;
use gray_utils::{f, ValueExt};
use log::info;

/// Encoded length of one legacy standard record
pub const BINARY_STANDARD_LEN: usize = 36;

/// Encoded length of one legacy no-position record
pub const BINARY_NO_POSITION_LEN: usize = 24;

/// On-disk layout of an output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Flag-selected fields, packed native-endian binary
    #[default]
    VariableBinary,
    /// Flag-selected fields, one whitespace-separated line per record
    VariableAscii,
    /// Legacy packed record: time, energy, position, log, decay id,
    /// detector id
    Binary,
    /// Legacy packed record without the position triple
    NoPosition,
    /// Legacy columnar text record
    Ascii,
}

impl Format {
    /// Whether this format starts with the `GRAY` header
    pub fn has_header(self) -> bool {
        matches!(self, Self::VariableBinary | Self::VariableAscii)
    }
}

/// A buffered interaction stream writer
///
/// Variable formats start with the magic/version/flags header; legacy
/// formats are raw records. Dropped events are the caller's concern; the
/// writer encodes whatever it is handed.
#[derive(Debug)]
pub struct Output {
    writer: BufWriter<File>,
    format: Format,
    flags: WriteFlags,
    path: PathBuf,
}

impl Output {
    /// Create the file and write the header if the format carries one
    pub fn new<P: AsRef<Path>>(path: P, format: Format, flags: WriteFlags) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        let mut output = Self {
            writer: BufWriter::new(file),
            format,
            flags,
            path: path.as_ref().to_path_buf(),
        };
        output.write_header()?;
        Ok(output)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn flags(&self) -> WriteFlags {
        self.flags
    }

    fn write_header(&mut self) -> Result<()> {
        match self.format {
            Format::VariableBinary => {
                self.writer.write_all(&MAGIC)?;
                self.writer.write_all(&VERSION.to_ne_bytes())?;
                self.writer.write_all(&self.flags.to_mask().to_ne_bytes())?;
            }
            Format::VariableAscii => {
                writeln!(self.writer, "GRAY")?;
                writeln!(self.writer, "{VERSION}")?;
                writeln!(self.writer, "{}", self.flags.to_mask())?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn write(&mut self, interaction: &Interaction) -> Result<()> {
        match self.format {
            Format::VariableBinary => self.write_variable_binary(interaction),
            Format::VariableAscii => self.write_variable_ascii(interaction),
            Format::Binary => self.write_binary_standard(interaction),
            Format::NoPosition => self.write_binary_no_position(interaction),
            Format::Ascii => self.write_ascii(interaction),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        info!("flushed output {}", self.path.display());
        Ok(())
    }

    fn write_variable_binary(&mut self, interaction: &Interaction) -> Result<()> {
        let w = &mut self.writer;
        if self.flags.time {
            w.write_all(&interaction.time.to_ne_bytes())?;
        }
        if self.flags.energy {
            w.write_all(&interaction.energy.to_ne_bytes())?;
        }
        if self.flags.pos {
            for axis in 0..3 {
                w.write_all(&interaction.pos[axis].to_ne_bytes())?;
            }
        }
        if self.flags.log {
            w.write_all(&pack_log(interaction).to_ne_bytes())?;
        }
        if self.flags.decay_id {
            w.write_all(&interaction.decay_id.to_ne_bytes())?;
        }
        if self.flags.det_id {
            w.write_all(&interaction.det_id.to_ne_bytes())?;
        }
        if self.flags.scatter_counts {
            for counter in scatter_counts(interaction) {
                w.write_all(&counter.to_ne_bytes())?;
            }
        }
        if self.flags.src_id {
            w.write_all(&interaction.src_id.to_ne_bytes())?;
        }
        if self.flags.mat_id {
            w.write_all(&interaction.mat_id.to_ne_bytes())?;
        }
        if self.flags.coinc_id {
            w.write_all(&interaction.coinc_id.to_ne_bytes())?;
        }
        Ok(())
    }

    fn write_variable_ascii(&mut self, interaction: &Interaction) -> Result<()> {
        let mut columns: Vec<String> = Vec::new();
        if self.flags.time {
            columns.push(interaction.time.sci(16, 2));
        }
        if self.flags.energy {
            columns.push(interaction.energy.sci(16, 2));
        }
        if self.flags.pos {
            for axis in 0..3 {
                columns.push(interaction.pos[axis].sci(16, 2));
            }
        }
        if self.flags.log {
            columns.push(pack_log(interaction).to_string());
        }
        if self.flags.decay_id {
            columns.push(interaction.decay_id.to_string());
        }
        if self.flags.det_id {
            columns.push(interaction.det_id.to_string());
        }
        if self.flags.scatter_counts {
            for counter in scatter_counts(interaction) {
                columns.push(counter.to_string());
            }
        }
        if self.flags.src_id {
            columns.push(interaction.src_id.to_string());
        }
        if self.flags.mat_id {
            columns.push(interaction.mat_id.to_string());
        }
        if self.flags.coinc_id {
            columns.push(interaction.coinc_id.to_string());
        }
        writeln!(self.writer, "{}", columns.join(" "))?;
        Ok(())
    }

    /// The packed legacy record: `f64` time, `f32` energy and position,
    /// then the log word, decay number, and detector id
    fn write_binary_standard(&mut self, interaction: &Interaction) -> Result<()> {
        let w = &mut self.writer;
        w.write_all(&interaction.time.to_ne_bytes())?;
        w.write_all(&(interaction.energy as f32).to_ne_bytes())?;
        for axis in 0..3 {
            w.write_all(&(interaction.pos[axis] as f32).to_ne_bytes())?;
        }
        w.write_all(&pack_log(interaction).to_ne_bytes())?;
        w.write_all(&interaction.decay_id.to_ne_bytes())?;
        w.write_all(&interaction.det_id.to_ne_bytes())?;
        Ok(())
    }

    fn write_binary_no_position(&mut self, interaction: &Interaction) -> Result<()> {
        let w = &mut self.writer;
        w.write_all(&interaction.time.to_ne_bytes())?;
        w.write_all(&(interaction.energy as f32).to_ne_bytes())?;
        w.write_all(&pack_log(interaction).to_ne_bytes())?;
        w.write_all(&interaction.decay_id.to_ne_bytes())?;
        w.write_all(&interaction.det_id.to_ne_bytes())?;
        Ok(())
    }

    /// Legacy columnar text: type, decay id, color, time, energy,
    /// position, source id, detector id
    fn write_ascii(&mut self, interaction: &Interaction) -> Result<()> {
        writeln!(
            self.writer,
            "{} {} {} {} {} {} {} {} {} {}",
            interaction.type_.as_i32(),
            interaction.decay_id,
            interaction.color,
            interaction.time.sci_col(23, 16),
            f!("{:>12}", interaction.energy.sci(6, 2)),
            interaction.pos.x.sci_col(15, 8),
            interaction.pos.y.sci_col(15, 8),
            interaction.pos.z.sci_col(15, 8),
            interaction.src_id,
            interaction.det_id,
        )?;
        Ok(())
    }
}

/// The five history counters, in record order
pub(crate) fn scatter_counts(interaction: &Interaction) -> [i32; 5] {
    [
        interaction.scatter_compton_phantom,
        interaction.scatter_compton_detector,
        interaction.scatter_rayleigh_phantom,
        interaction.scatter_rayleigh_detector,
        interaction.xray_flouresence,
    ]
}
