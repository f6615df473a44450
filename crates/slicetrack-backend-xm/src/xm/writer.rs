//! XM file writer - assembles all components into a complete XM file.

use std::io::{self, Write};

use slicetrack_plan::RemixPlan;

use super::header::{XmHeader, XM_ORDER_TABLE_LEN};
use super::instrument::XmInstrument;
use super::pattern::{pack_pattern, write_pattern, CellPacking};
use crate::error::EncodeError;
use crate::grid::PatternGrid;

/// Serialization settings that do not come from the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSettings {
    /// Song name (20 ASCII characters max).
    pub song_name: String,
    /// Tempo header field.
    pub tempo: u16,
    /// Speed header field.
    pub speed: u16,
    /// Pattern cell packing.
    pub cell_packing: CellPacking,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            song_name: String::new(),
            tempo: super::header::DEFAULT_TEMPO,
            speed: super::header::DEFAULT_SPEED,
            cell_packing: CellPacking::Full,
        }
    }
}

impl ModuleSettings {
    /// Default settings with the given song name.
    pub fn named(song_name: impl Into<String>) -> Self {
        Self {
            song_name: song_name.into(),
            ..Default::default()
        }
    }
}

/// A packed pattern ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmPatternBlock {
    /// Number of rows.
    pub num_rows: u16,
    /// Packed cell data.
    pub packed: Vec<u8>,
}

/// XM module containing all song data.
///
/// Instruments borrow their PCM from the plan, so building a module does
/// not copy sample data.
#[derive(Debug, Clone)]
pub struct XmModule<'a> {
    /// Module header.
    pub header: XmHeader,
    /// Packed patterns, in declaration order.
    pub patterns: Vec<XmPatternBlock>,
    /// Instruments, in slice order.
    pub instruments: Vec<XmInstrument<'a>>,
}

impl<'a> XmModule<'a> {
    /// Build a module from a plan and its grid.
    ///
    /// Fails only when a count cannot be represented in its header field.
    pub fn from_plan(
        plan: &'a RemixPlan,
        grid: &PatternGrid,
        settings: &ModuleSettings,
    ) -> Result<Self, EncodeError> {
        EncodeError::check("patterns", grid.pattern_count(), XM_ORDER_TABLE_LEN)?;
        EncodeError::check("channels", grid.channel_count(), u16::MAX as usize)?;
        EncodeError::check("rows", grid.rows_per_pattern(), u16::MAX as usize)?;
        EncodeError::check("instruments", plan.sample_buffers.len(), u16::MAX as usize)?;

        let mut patterns = Vec::with_capacity(grid.pattern_count());
        for pattern in grid.patterns() {
            let packed = pack_pattern(pattern, settings.cell_packing);
            EncodeError::check("packed pattern bytes", packed.len(), u16::MAX as usize)?;
            patterns.push(XmPatternBlock {
                num_rows: pattern.num_rows() as u16,
                packed,
            });
        }

        let mut instruments = Vec::with_capacity(plan.sample_buffers.len());
        for (index, buffer) in plan.sample_buffers.iter().enumerate() {
            EncodeError::check("sample frames", buffer.len(), u32::MAX as usize)?;
            instruments.push(XmInstrument::for_slice(index, &buffer.pcm));
        }

        let header = XmHeader::new(
            &settings.song_name,
            grid.channel_count() as u16,
            patterns.len() as u16,
            instruments.len() as u16,
            settings.tempo,
            settings.speed,
        );

        Ok(Self {
            header,
            patterns,
            instruments,
        })
    }

    /// Write the complete XM module to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header.write(writer)?;

        for pattern in &self.patterns {
            write_pattern(writer, pattern.num_rows, &pattern.packed)?;
        }

        for instrument in &self.instruments {
            instrument.write(writer)?;
        }

        Ok(())
    }

    /// Write the module to a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Compute the BLAKE3 hash of the module bytes.
    pub fn compute_hash(&self) -> io::Result<String> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
