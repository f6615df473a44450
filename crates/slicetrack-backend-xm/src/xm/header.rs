//! XM module header structures and constants.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// XM file magic identifier.
pub const XM_MAGIC: &[u8; 17] = b"Extended Module: ";

/// Byte written between the song name and the tracker name.
pub const XM_EOF_MARKER: u8 = 0x1A;

/// Value of the header size field.
pub const XM_HEADER_SIZE: u32 = 60;

/// Width of the song name field.
pub const XM_SONG_NAME_LEN: usize = 20;

/// Width of the tracker name field.
pub const XM_TRACKER_NAME_LEN: usize = 20;

/// Tracker name written into every module.
pub const XM_TRACKER_NAME: &str = "SliceTrack XM Writer";

/// Length of the order table.
pub const XM_ORDER_TABLE_LEN: usize = 256;

/// Bytes before the header size field: magic, name, marker, tracker name.
pub const XM_PREAMBLE_LEN: usize = 17 + XM_SONG_NAME_LEN + 1 + XM_TRACKER_NAME_LEN;

/// Total bytes written by [`XmHeader::write`].
pub const XM_HEADER_BLOCK_LEN: usize = XM_PREAMBLE_LEN + 4 + 8 * 2 + XM_ORDER_TABLE_LEN;

/// Default tempo field value.
pub const DEFAULT_TEMPO: u16 = 125;

/// Default speed field value.
pub const DEFAULT_SPEED: u16 = 6;

/// Encode a string as a fixed-width ASCII field.
///
/// Non-ASCII characters become `?`. The result is truncated or NUL-padded
/// to exactly `width` bytes.
pub fn fixed_ascii(text: &str, width: usize) -> Vec<u8> {
    let mut field: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .take(width)
        .collect();
    field.resize(width, 0);
    field
}

/// Write a fixed-width ASCII field.
pub fn write_fixed_ascii<W: Write>(writer: &mut W, text: &str, width: usize) -> io::Result<()> {
    writer.write_all(&fixed_ascii(text, width))
}

/// XM module header data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmHeader {
    /// Song name (20 characters max).
    pub name: String,
    /// Number of positions in the order table.
    pub song_length: u16,
    /// Restart position for looping.
    pub restart_position: u16,
    /// Number of channels.
    pub num_channels: u16,
    /// Number of patterns.
    pub num_patterns: u16,
    /// Number of instruments.
    pub num_instruments: u16,
    /// Flags (0 = linear pitch mode as written by this encoder).
    pub flags: u16,
    /// Tempo field.
    pub tempo: u16,
    /// Speed field.
    pub speed: u16,
    /// Pattern order table (256 entries).
    pub order_table: [u8; XM_ORDER_TABLE_LEN],
}

impl Default for XmHeader {
    fn default() -> Self {
        Self {
            name: String::new(),
            song_length: 0,
            restart_position: 0,
            num_channels: 4,
            num_patterns: 0,
            num_instruments: 0,
            flags: 0,
            tempo: DEFAULT_TEMPO,
            speed: DEFAULT_SPEED,
            order_table: [0; XM_ORDER_TABLE_LEN],
        }
    }
}

impl XmHeader {
    /// Create a header for a song whose patterns play in declaration order.
    pub fn new(
        name: &str,
        num_channels: u16,
        num_patterns: u16,
        num_instruments: u16,
        tempo: u16,
        speed: u16,
    ) -> Self {
        let mut header = Self {
            name: name.to_string(),
            num_channels,
            num_patterns,
            num_instruments,
            tempo,
            speed,
            ..Default::default()
        };
        header.set_sequential_order(num_patterns);
        header
    }

    /// Play patterns `0..count` in order. Entries past `count` are zero.
    pub fn set_sequential_order(&mut self, count: u16) {
        let count = (count as usize).min(XM_ORDER_TABLE_LEN);
        self.order_table = [0; XM_ORDER_TABLE_LEN];
        for (i, slot) in self.order_table.iter_mut().take(count).enumerate() {
            *slot = i as u8;
        }
        self.song_length = count as u16;
    }

    /// Write the header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(XM_MAGIC)?;
        write_fixed_ascii(writer, &self.name, XM_SONG_NAME_LEN)?;
        writer.write_u8(XM_EOF_MARKER)?;
        write_fixed_ascii(writer, XM_TRACKER_NAME, XM_TRACKER_NAME_LEN)?;

        writer.write_u32::<LittleEndian>(XM_HEADER_SIZE)?;
        writer.write_u16::<LittleEndian>(self.song_length)?;
        writer.write_u16::<LittleEndian>(self.restart_position)?;
        writer.write_u16::<LittleEndian>(self.num_channels)?;
        writer.write_u16::<LittleEndian>(self.num_patterns)?;
        writer.write_u16::<LittleEndian>(self.num_instruments)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.tempo)?;
        writer.write_u16::<LittleEndian>(self.speed)?;

        writer.write_all(&self.order_table)?;

        Ok(())
    }
}
