//! Interaction stream reader

// crate modules
use crate::error::{Error, Result};
use crate::flags::{unpack_log, WriteFlags};
use crate::writer::Format;
use crate::{MAGIC, VERSION};

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

// external crates
use gray_physics::{Interaction, InteractionType};
use gray_vrmath::Vec3;

/// Reader for everything [Output](crate::Output) writes
///
/// Variable formats recover their field selection from the file header;
/// legacy formats have a fixed layout. Fields a file does not carry stay at
/// their defaults in the returned records.
#[derive(Debug)]
pub struct Input {
    reader: BufReader<File>,
    format: Format,
    flags: WriteFlags,
    version: u32,
}

impl Input {
    /// Open a stream, consuming the header when the format has one
    pub fn open<P: AsRef<Path>>(path: P, format: Format) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut input = Self {
            reader: BufReader::new(file),
            format,
            flags: WriteFlags::all(),
            version: VERSION,
        };
        input.read_header()?;
        Ok(input)
    }

    /// The field selection recovered from the header
    pub fn flags(&self) -> WriteFlags {
        self.flags
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn read_header(&mut self) -> Result<()> {
        match self.format {
            Format::VariableBinary => {
                let mut magic = [0u8; 4];
                self.reader.read_exact(&mut magic)?;
                if magic != MAGIC {
                    return Err(Error::BadMagic);
                }
                self.version = self.read_u32()?;
                if self.version > VERSION {
                    return Err(Error::UnsupportedVersion(self.version));
                }
                let mask = self.read_u32()?;
                self.flags = WriteFlags::from_mask(mask);
            }
            Format::VariableAscii => {
                let magic = self.read_line()?;
                if magic.trim() != "GRAY" {
                    return Err(Error::BadMagic);
                }
                self.version = self
                    .read_line()?
                    .trim()
                    .parse()
                    .map_err(|_| Error::MalformedRecord("version line".into()))?;
                if self.version > VERSION {
                    return Err(Error::UnsupportedVersion(self.version));
                }
                let mask: u32 = self
                    .read_line()?
                    .trim()
                    .parse()
                    .map_err(|_| Error::MalformedRecord("flags line".into()))?;
                self.flags = WriteFlags::from_mask(mask);
            }
            _ => {}
        }
        Ok(())
    }

    /// Read the next record, `None` at end of stream
    pub fn read_interaction(&mut self) -> Result<Option<Interaction>> {
        match self.format {
            Format::VariableBinary => self.read_variable_binary(),
            Format::VariableAscii => self.read_variable_ascii(),
            Format::Binary => self.read_binary(true),
            Format::NoPosition => self.read_binary(false),
            Format::Ascii => self.read_ascii(),
        }
    }

    /// Read up to `count` records
    pub fn read_interactions(&mut self, count: usize) -> Result<Vec<Interaction>> {
        let mut interactions = Vec::with_capacity(count);
        for _ in 0..count {
            match self.read_interaction()? {
                Some(interaction) => interactions.push(interaction),
                None => break,
            }
        }
        Ok(interactions)
    }

    fn read_variable_binary(&mut self) -> Result<Option<Interaction>> {
        let flags = self.flags;
        let record_len = variable_record_len(&flags);
        let mut record = vec![0u8; record_len];
        let mut filled = 0;
        while filled < record_len {
            let count = self.reader.read(&mut record[filled..])?;
            if count == 0 {
                return if filled == 0 { Ok(None) } else { Err(truncated()) };
            }
            filled += count;
        }

        let mut cursor = 0usize;
        // slices are exactly 8 and 4 bytes, so the conversions cannot fail
        let mut take_f64 = |buf: &[u8]| -> f64 {
            let value = f64::from_ne_bytes(buf[cursor..cursor + 8].try_into().unwrap());
            cursor += 8;
            value
        };
        let mut interaction = Interaction::default();
        if flags.time {
            interaction.time = take_f64(&record);
        }
        if flags.energy {
            interaction.energy = take_f64(&record);
        }
        if flags.pos {
            for axis in 0..3 {
                interaction.pos[axis] = take_f64(&record);
            }
        }
        let mut take_i32 = |buf: &[u8]| -> i32 {
            let value = i32::from_ne_bytes(buf[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            value
        };
        if flags.log {
            apply_log(&mut interaction, take_i32(&record));
        }
        if flags.decay_id {
            interaction.decay_id = take_i32(&record);
        }
        if flags.det_id {
            interaction.det_id = take_i32(&record);
        }
        if flags.scatter_counts {
            interaction.scatter_compton_phantom = take_i32(&record);
            interaction.scatter_compton_detector = take_i32(&record);
            interaction.scatter_rayleigh_phantom = take_i32(&record);
            interaction.scatter_rayleigh_detector = take_i32(&record);
            interaction.xray_flouresence = take_i32(&record);
        }
        if flags.src_id {
            interaction.src_id = take_i32(&record);
        }
        if flags.mat_id {
            interaction.mat_id = take_i32(&record);
        }
        if flags.coinc_id {
            interaction.coinc_id = take_i32(&record);
        }
        Ok(Some(interaction))
    }

    fn read_variable_ascii(&mut self) -> Result<Option<Interaction>> {
        let line = self.read_line()?;
        if line.is_empty() {
            return Ok(None);
        }
        let mut fields = line.split_whitespace();
        let mut next_f64 = |name: &str| -> Result<f64> {
            fields
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| Error::MalformedRecord(name.to_string()))
        };

        let flags = self.flags;
        let mut interaction = Interaction::default();
        if flags.time {
            interaction.time = next_f64("time")?;
        }
        if flags.energy {
            interaction.energy = next_f64("energy")?;
        }
        if flags.pos {
            interaction.pos = Vec3::new(next_f64("x")?, next_f64("y")?, next_f64("z")?);
        }
        if flags.log {
            apply_log(&mut interaction, next_f64("log")? as i32);
        }
        if flags.decay_id {
            interaction.decay_id = next_f64("decay_id")? as i32;
        }
        if flags.det_id {
            interaction.det_id = next_f64("det_id")? as i32;
        }
        if flags.scatter_counts {
            interaction.scatter_compton_phantom = next_f64("scatter")? as i32;
            interaction.scatter_compton_detector = next_f64("scatter")? as i32;
            interaction.scatter_rayleigh_phantom = next_f64("scatter")? as i32;
            interaction.scatter_rayleigh_detector = next_f64("scatter")? as i32;
            interaction.xray_flouresence = next_f64("scatter")? as i32;
        }
        if flags.src_id {
            interaction.src_id = next_f64("src_id")? as i32;
        }
        if flags.mat_id {
            interaction.mat_id = next_f64("mat_id")? as i32;
        }
        if flags.coinc_id {
            interaction.coinc_id = next_f64("coinc_id")? as i32;
        }
        Ok(Some(interaction))
    }

    fn read_binary(&mut self, with_position: bool) -> Result<Option<Interaction>> {
        let time = match self.try_read_f64()? {
            Some(time) => time,
            None => return Ok(None),
        };
        let mut interaction = Interaction {
            time,
            energy: f64::from(self.read_f32()?),
            ..Default::default()
        };
        if with_position {
            for axis in 0..3 {
                interaction.pos[axis] = f64::from(self.read_f32()?);
            }
        }
        apply_log(&mut interaction, self.read_i32()?);
        interaction.decay_id = self.read_i32()?;
        interaction.det_id = self.read_i32()?;
        Ok(Some(interaction))
    }

    fn read_ascii(&mut self) -> Result<Option<Interaction>> {
        let line = self.read_line()?;
        if line.is_empty() {
            return Ok(None);
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            return Err(Error::MalformedRecord(line));
        }
        let parse = |index: usize| -> Result<f64> {
            fields[index]
                .parse()
                .map_err(|_| Error::MalformedRecord(fields[index].to_string()))
        };
        Ok(Some(Interaction {
            type_: InteractionType::from_i32(parse(0)? as i32),
            decay_id: parse(1)? as i32,
            color: parse(2)? as i32,
            time: parse(3)?,
            energy: parse(4)?,
            pos: Vec3::new(parse(5)?, parse(6)?, parse(7)?),
            src_id: parse(8)? as i32,
            det_id: parse(9)? as i32,
            ..Default::default()
        }))
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim_end().to_string())
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buffer = [0u8; 4];
        self.reader.read_exact(&mut buffer)?;
        Ok(u32::from_ne_bytes(buffer))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buffer = [0u8; 4];
        self.reader.read_exact(&mut buffer)?;
        Ok(i32::from_ne_bytes(buffer))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let mut buffer = [0u8; 4];
        self.reader.read_exact(&mut buffer)?;
        Ok(f32::from_ne_bytes(buffer))
    }

    /// Read a double, yielding `None` at a clean end of stream
    fn try_read_f64(&mut self) -> Result<Option<f64>> {
        let mut buffer = [0u8; 8];
        let mut filled = 0;
        while filled < buffer.len() {
            let count = self.reader.read(&mut buffer[filled..])?;
            if count == 0 {
                return if filled == 0 { Ok(None) } else { Err(truncated()) };
            }
            filled += count;
        }
        Ok(Some(f64::from_ne_bytes(buffer)))
    }
}

fn truncated() -> Error {
    Error::MalformedRecord("truncated record".to_string())
}

/// Byte length of one variable-format binary record under these flags
fn variable_record_len(flags: &WriteFlags) -> usize {
    let mut len = 0;
    len += if flags.time { 8 } else { 0 };
    len += if flags.energy { 8 } else { 0 };
    len += if flags.pos { 24 } else { 0 };
    len += if flags.log { 4 } else { 0 };
    len += if flags.decay_id { 4 } else { 0 };
    len += if flags.det_id { 4 } else { 0 };
    len += if flags.scatter_counts { 20 } else { 0 };
    len += if flags.src_id { 4 } else { 0 };
    len += if flags.mat_id { 4 } else { 0 };
    len += if flags.coinc_id { 4 } else { 0 };
    len
}

/// Spread a packed log word back over the record fields
fn apply_log(interaction: &mut Interaction, log: i32) {
    let (type_, color, _scatters, mat_id, src_id) = unpack_log(log);
    interaction.type_ = InteractionType::from_i32(type_);
    interaction.color = color;
    interaction.mat_id = mat_id;
    interaction.src_id = src_id;
}
