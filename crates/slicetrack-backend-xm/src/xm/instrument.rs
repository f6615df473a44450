//! XM instrument and sample headers, followed by raw PCM.
//!
//! Each slice becomes one instrument holding one sample. Envelopes, vibrato
//! and keymap are left zeroed and sample looping is off.
//!
//! Sample data is written as plain signed 16-bit little-endian PCM. It is
//! not delta encoded; players that insist on delta-encoded 16-bit data will
//! hear noise.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::header::write_fixed_ascii;

/// Width of the instrument name field.
pub const XM_INSTRUMENT_NAME_LEN: usize = 22;

/// Width of the sample name field.
pub const XM_SAMPLE_NAME_LEN: usize = 22;

/// Value of the sample header size field.
pub const XM_SAMPLE_HEADER_SIZE: u32 = 40;

/// Length of the zeroed envelope/keymap block.
pub const XM_INSTRUMENT_EXTRA_LEN: usize = 96;

/// Bytes of instrument header before the sample header.
pub const XM_INSTRUMENT_HEADER_LEN: usize = XM_INSTRUMENT_NAME_LEN + 1 + 2 + 4 + XM_INSTRUMENT_EXTRA_LEN;

/// Sample type byte marking 16-bit data.
pub const XM_SAMPLE_TYPE_16BIT: u8 = 0x10;

/// Default sample volume.
pub const XM_SAMPLE_VOLUME: u8 = 64;

/// Centre panning.
pub const XM_SAMPLE_PANNING: u8 = 128;

/// One instrument with its single sample.
///
/// The PCM is borrowed from the plan's sample buffers rather than copied.
#[derive(Debug, Clone)]
pub struct XmInstrument<'a> {
    /// Instrument name (22 characters max).
    pub name: String,
    /// Sample name (22 characters max).
    pub sample_name: String,
    /// Sample volume (0-64).
    pub volume: u8,
    /// Finetune (-128..127).
    pub finetune: i8,
    /// Panning (0-255).
    pub panning: u8,
    /// Relative note offset.
    pub relative_note: i8,
    /// Signed 16-bit mono PCM.
    pub pcm: &'a [i16],
}

impl<'a> XmInstrument<'a> {
    /// Instrument for the slice at zero-based `index`, named `ins{n}` /
    /// `sample{n}` with `n = index + 1`.
    pub fn for_slice(index: usize, pcm: &'a [i16]) -> Self {
        let number = index + 1;
        Self {
            name: format!("ins{}", number),
            sample_name: format!("sample{}", number),
            volume: XM_SAMPLE_VOLUME,
            finetune: 0,
            panning: XM_SAMPLE_PANNING,
            relative_note: 0,
            pcm,
        }
    }

    /// Sample length in samples.
    pub fn sample_length(&self) -> usize {
        self.pcm.len()
    }

    /// Write the instrument header, sample header and PCM payload.
    ///
    /// The caller has already checked that the sample length fits in 32 bits.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_fixed_ascii(writer, &self.name, XM_INSTRUMENT_NAME_LEN)?;

        // Instrument type
        writer.write_u8(0)?;

        // One sample per instrument
        writer.write_u16::<LittleEndian>(1)?;
        writer.write_u32::<LittleEndian>(XM_SAMPLE_HEADER_SIZE)?;

        // Keymap and envelopes, all zero
        writer.write_all(&[0u8; XM_INSTRUMENT_EXTRA_LEN])?;

        self.write_sample_header(writer)?;
        self.write_pcm(writer)
    }

    fn write_sample_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.pcm.len() as u32)?;

        // Loop start and loop length: looping is off
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(0)?;

        writer.write_u8(self.volume)?;
        writer.write_i8(self.finetune)?;
        writer.write_u8(XM_SAMPLE_TYPE_16BIT)?;
        writer.write_u8(self.panning)?;
        writer.write_i8(self.relative_note)?;

        // Reserved
        writer.write_u8(0)?;

        write_fixed_ascii(writer, &self.sample_name, XM_SAMPLE_NAME_LEN)
    }

    fn write_pcm<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(self.pcm.len() * 2);
        for &sample in self.pcm {
            bytes.write_i16::<LittleEndian>(sample)?;
        }
        writer.write_all(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_lengths() {
        assert_eq!(XM_INSTRUMENT_HEADER_LEN, 125);

        let instrument = XmInstrument::for_slice(0, &[]);
        let mut buf = Vec::new();
        instrument.write(&mut buf).unwrap();
        assert_eq!(buf.len(), XM_INSTRUMENT_HEADER_LEN + XM_SAMPLE_HEADER_SIZE as usize);
    }

    #[test]
    fn test_instrument_layout() {
        let pcm = [1i16, -2, 300];
        let instrument = XmInstrument::for_slice(4, &pcm);
        let mut buf = Vec::new();
        instrument.write(&mut buf).unwrap();

        assert_eq!(&buf[0..4], b"ins5");
        assert!(buf[4..22].iter().all(|&b| b == 0));
        assert_eq!(buf[22], 0); // type
        assert_eq!(&buf[23..25], &[1, 0]); // num samples
        assert_eq!(&buf[25..29], &[40, 0, 0, 0]); // sample header size
        assert!(buf[29..125].iter().all(|&b| b == 0));

        let sample = &buf[125..165];
        assert_eq!(&sample[0..4], &[3, 0, 0, 0]); // length in samples
        assert_eq!(&sample[4..12], &[0; 8]); // loop
        assert_eq!(sample[12], 64); // volume
        assert_eq!(sample[13], 0); // finetune
        assert_eq!(sample[14], 0x10); // 16-bit
        assert_eq!(sample[15], 128); // panning
        assert_eq!(sample[16], 0); // relative note
        assert_eq!(sample[17], 0); // reserved
        assert_eq!(&sample[18..25], b"sample5");

        assert_eq!(&buf[165..], &[0x01, 0x00, 0xFE, 0xFF, 0x2C, 0x01]);
    }

    #[test]
    fn test_pcm_is_not_delta_encoded() {
        let pcm = [100i16, 100, 100];
        let instrument = XmInstrument::for_slice(0, &pcm);
        let mut buf = Vec::new();
        instrument.write(&mut buf).unwrap();
        assert_eq!(&buf[165..], &[100, 0, 100, 0, 100, 0]);
    }
}
