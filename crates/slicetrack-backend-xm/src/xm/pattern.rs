//! XM pattern packing.
//!
//! Cells are packed row-major with the channel innermost. Two packings are
//! supported:
//!
//! - [`CellPacking::Full`] (default): an absent cell is a single `0x00`;
//!   a present cell is the flag byte `0x8F` followed by five bytes
//!   `note, instrument, volume, effect, effect_param`.
//! - [`CellPacking::Compact`]: an absent cell is `0x80`; a present cell
//!   sets bits 0-4 only for non-zero fields and writes only those fields.

use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::clamp::mask_byte;
use crate::grid::{Cell, Pattern};

/// Value of the pattern header length field.
pub const XM_PATTERN_HEADER_LEN: u32 = 9;

/// Set on every packed flag byte.
pub const PACK_FLAG: u8 = 0x80;
/// Note follows.
pub const PACK_NOTE: u8 = 0x01;
/// Instrument follows.
pub const PACK_INSTRUMENT: u8 = 0x02;
/// Volume column follows.
pub const PACK_VOLUME: u8 = 0x04;
/// Effect type follows.
pub const PACK_EFFECT: u8 = 0x08;
/// Effect parameter follows.
pub const PACK_EFFECT_PARAM: u8 = 0x10;

/// Flag byte written for every present cell in [`CellPacking::Full`].
pub const FULL_CELL_FLAGS: u8 = PACK_FLAG | PACK_NOTE | PACK_INSTRUMENT | PACK_VOLUME | PACK_EFFECT;

/// How present and absent cells are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPacking {
    /// Fixed six bytes per present cell, one zero byte per absent cell.
    #[default]
    Full,
    /// Only non-zero fields, flagged individually.
    Compact,
}

/// Byte fields of a cell as they go on the wire.
fn cell_bytes(cell: &Cell) -> [u8; 5] {
    [
        cell.note,
        mask_byte(cell.instrument),
        mask_byte(cell.volume as u32),
        mask_byte(cell.effect as u32),
        mask_byte(cell.effect_param as u32),
    ]
}

/// Append one packed cell to `output`.
pub fn pack_cell(cell: Option<&Cell>, packing: CellPacking, output: &mut Vec<u8>) {
    match (packing, cell) {
        (CellPacking::Full, None) => output.push(0x00),
        (CellPacking::Full, Some(cell)) => {
            output.push(FULL_CELL_FLAGS);
            output.extend_from_slice(&cell_bytes(cell));
        }
        (CellPacking::Compact, None) => output.push(PACK_FLAG),
        (CellPacking::Compact, Some(cell)) => {
            let fields = cell_bytes(cell);
            let bits = [
                PACK_NOTE,
                PACK_INSTRUMENT,
                PACK_VOLUME,
                PACK_EFFECT,
                PACK_EFFECT_PARAM,
            ];

            let mut flags = PACK_FLAG;
            for (value, bit) in fields.iter().zip(bits) {
                if *value != 0 {
                    flags |= bit;
                }
            }

            output.push(flags);
            output.extend(fields.iter().filter(|&&v| v != 0));
        }
    }
}

/// Pack a whole pattern.
pub fn pack_pattern(pattern: &Pattern, packing: CellPacking) -> Vec<u8> {
    let mut output = Vec::with_capacity(pattern.cells().len());
    for cell in pattern.cells() {
        pack_cell(cell.as_ref(), packing, &mut output);
    }
    output
}

/// Write a pattern block: header length, row count, packed size, packed data.
///
/// The caller has already checked that the row count and packed size fit
/// in 16 bits.
pub fn write_pattern<W: Write>(writer: &mut W, num_rows: u16, packed: &[u8]) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(XM_PATTERN_HEADER_LEN)?;
    writer.write_u16::<LittleEndian>(num_rows)?;
    writer.write_u16::<LittleEndian>(packed.len() as u16)?;
    writer.write_all(packed)?;
    Ok(())
}

/// A cell decoded back from packed bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedCell {
    pub note: u8,
    pub instrument: u8,
    pub volume: u8,
    pub effect: u8,
    pub effect_param: u8,
}

/// Decode packed pattern data written with `packing`.
///
/// Returns `None` if the data ends in the middle of a cell or holds a flag
/// byte the packing never produces.
pub fn unpack_pattern(data: &[u8], packing: CellPacking) -> Option<Vec<Option<PackedCell>>> {
    let mut cells = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let flags = data[pos];
        pos += 1;

        match packing {
            CellPacking::Full => match flags {
                0x00 => cells.push(None),
                FULL_CELL_FLAGS => {
                    let b = data.get(pos..pos + 5)?;
                    pos += 5;
                    cells.push(Some(PackedCell {
                        note: b[0],
                        instrument: b[1],
                        volume: b[2],
                        effect: b[3],
                        effect_param: b[4],
                    }));
                }
                _ => return None,
            },
            CellPacking::Compact => {
                if flags & PACK_FLAG == 0 {
                    return None;
                }
                if flags == PACK_FLAG {
                    cells.push(None);
                    continue;
                }
                let mut cell = PackedCell::default();
                let slots: [(u8, &mut u8); 5] = [
                    (PACK_NOTE, &mut cell.note),
                    (PACK_INSTRUMENT, &mut cell.instrument),
                    (PACK_VOLUME, &mut cell.volume),
                    (PACK_EFFECT, &mut cell.effect),
                    (PACK_EFFECT_PARAM, &mut cell.effect_param),
                ];
                for (bit, slot) in slots {
                    if flags & bit != 0 {
                        *slot = *data.get(pos)?;
                        pos += 1;
                    }
                }
                cells.push(Some(cell));
            }
        }
    }

    Some(cells)
}
