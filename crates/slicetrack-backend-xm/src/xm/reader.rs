//! Read-back parser for modules written by [`super::XmModule`].
//!
//! Walks exactly the layout the writer produces and reports every header
//! field, pattern block and instrument payload. Used by the `inspect`
//! command and by tests.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use slicetrack_plan::BackendError;
use thiserror::Error;

use super::header::{XM_MAGIC, XM_ORDER_TABLE_LEN, XM_SONG_NAME_LEN, XM_TRACKER_NAME_LEN};
use super::instrument::{XM_INSTRUMENT_EXTRA_LEN, XM_INSTRUMENT_NAME_LEN, XM_SAMPLE_NAME_LEN};

/// Error raised while reading a module back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The data ends before a field is complete.
    #[error("Unexpected end of data at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    /// The data does not start with the XM magic.
    #[error("Invalid XM magic identifier")]
    InvalidMagic,
}

impl BackendError for ReadError {
    fn code(&self) -> &'static str {
        match self {
            ReadError::Truncated { .. } => "XMREAD_001",
            ReadError::InvalidMagic => "XMREAD_002",
        }
    }

    fn category(&self) -> &'static str {
        "xm"
    }
}

/// One pattern block as found in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    /// Value of the pattern header length field.
    pub header_len: u32,
    /// Number of rows.
    pub num_rows: u16,
    /// Packed cell bytes.
    #[serde(skip)]
    pub packed: Vec<u8>,
    /// Length of `packed`.
    pub packed_size: u16,
}

/// One instrument block as found in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentSummary {
    pub name: String,
    pub instrument_type: u8,
    pub num_samples: u16,
    pub sample_header_size: u32,
    pub sample_length: u32,
    pub loop_start: u32,
    pub loop_length: u32,
    pub volume: u8,
    pub finetune: i8,
    pub sample_type: u8,
    pub panning: u8,
    pub relative_note: i8,
    pub sample_name: String,
    /// Offset of the first PCM byte in the file.
    pub pcm_offset: usize,
    /// Decoded PCM.
    #[serde(skip)]
    pub pcm: Vec<i16>,
}

/// Everything a written module declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XmSummary {
    pub song_name: String,
    pub tracker_name: String,
    pub header_size: u32,
    pub song_length: u16,
    pub restart_position: u16,
    pub num_channels: u16,
    pub num_patterns: u16,
    pub num_instruments: u16,
    pub flags: u16,
    pub tempo: u16,
    pub speed: u16,
    #[serde(skip)]
    pub order_table: Vec<u8>,
    pub patterns: Vec<PatternSummary>,
    pub instruments: Vec<InstrumentSummary>,
    /// Bytes after the last instrument.
    pub trailing_bytes: usize,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(ReadError::Truncated {
                offset: self.pos,
                needed: len - (self.data.len() - self.pos),
            }),
        }
    }

    fn u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    fn i8(&mut self) -> Result<i8, ReadError> {
        Ok(self.u8()? as i8)
    }

    fn u16(&mut self) -> Result<u16, ReadError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn u32(&mut self) -> Result<u32, ReadError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn text(&mut self, len: usize) -> Result<String, ReadError> {
        let bytes = self.take(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

/// Parse a module produced by the XM writer.
pub fn read_summary(data: &[u8]) -> Result<XmSummary, ReadError> {
    let mut cursor = Cursor { data, pos: 0 };

    if cursor.take(XM_MAGIC.len())? != XM_MAGIC {
        return Err(ReadError::InvalidMagic);
    }
    let song_name = cursor.text(XM_SONG_NAME_LEN)?;
    cursor.u8()?;
    let tracker_name = cursor.text(XM_TRACKER_NAME_LEN)?;

    let header_size = cursor.u32()?;
    let song_length = cursor.u16()?;
    let restart_position = cursor.u16()?;
    let num_channels = cursor.u16()?;
    let num_patterns = cursor.u16()?;
    let num_instruments = cursor.u16()?;
    let flags = cursor.u16()?;
    let tempo = cursor.u16()?;
    let speed = cursor.u16()?;
    let order_table = cursor.take(XM_ORDER_TABLE_LEN)?.to_vec();

    let mut patterns = Vec::with_capacity(num_patterns as usize);
    for _ in 0..num_patterns {
        let header_len = cursor.u32()?;
        let num_rows = cursor.u16()?;
        let packed_size = cursor.u16()?;
        let packed = cursor.take(packed_size as usize)?.to_vec();
        patterns.push(PatternSummary {
            header_len,
            num_rows,
            packed,
            packed_size,
        });
    }

    let mut instruments = Vec::with_capacity(num_instruments as usize);
    for _ in 0..num_instruments {
        let name = cursor.text(XM_INSTRUMENT_NAME_LEN)?;
        let instrument_type = cursor.u8()?;
        let num_samples = cursor.u16()?;
        let sample_header_size = cursor.u32()?;
        cursor.take(XM_INSTRUMENT_EXTRA_LEN)?;

        let sample_length = cursor.u32()?;
        let loop_start = cursor.u32()?;
        let loop_length = cursor.u32()?;
        let volume = cursor.u8()?;
        let finetune = cursor.i8()?;
        let sample_type = cursor.u8()?;
        let panning = cursor.u8()?;
        let relative_note = cursor.i8()?;
        cursor.u8()?;
        let sample_name = cursor.text(XM_SAMPLE_NAME_LEN)?;

        let pcm_offset = cursor.pos;
        let byte_len = (sample_length as usize).saturating_mul(2);
        let pcm = cursor
            .take(byte_len)?
            .chunks_exact(2)
            .map(LittleEndian::read_i16)
            .collect();

        instruments.push(InstrumentSummary {
            name,
            instrument_type,
            num_samples,
            sample_header_size,
            sample_length,
            loop_start,
            loop_length,
            volume,
            finetune,
            sample_type,
            panning,
            relative_note,
            sample_name,
            pcm_offset,
            pcm,
        });
    }

    Ok(XmSummary {
        song_name,
        tracker_name,
        header_size,
        song_length,
        restart_position,
        num_channels,
        num_patterns,
        num_instruments,
        flags,
        tempo,
        speed,
        order_table,
        patterns,
        instruments,
        trailing_bytes: data.len() - cursor.pos,
    })
}
