//! XM (Extended Module) writer and read-back parser.
//!
//! The writer produces a reduced XM dialect: enough for the file to declare
//! itself as XM and be opened by common players, without envelopes, looping
//! or effects.
//!
//! # Layout
//!
//! ```text
//! "Extended Module: "   17 bytes
//! song name             20 bytes, NUL padded
//! 0x1A
//! tracker name          20 bytes
//! header size           u32 (60)
//! song length, restart, channels, patterns, instruments, flags, tempo, speed   u16 each
//! order table           256 bytes
//! per pattern:          u32 9, rows u16, packed size u16, packed cells
//! per instrument:       name 22, type u8, samples u16, sample header size u32,
//!                       96 zero bytes, 40-byte sample header, raw i16 PCM
//! ```
//!
//! All integers are little-endian.

mod header;
mod instrument;
mod pattern;
mod reader;
mod writer;

pub use header::*;
pub use instrument::*;
pub use pattern::*;
pub use reader::*;
pub use writer::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid;
    use slicetrack_plan::{PlannerConfig, RemixPlan};

    #[test]
    fn reader_rejects_too_small_files() {
        let err = read_summary(&[]).unwrap_err();
        match err {
            ReadError::Truncated { .. } => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn reader_accepts_writer_output() {
        let plan = RemixPlan::empty(&PlannerConfig::default());
        let grid = build_grid(&plan).unwrap();
        let module = XmModule::from_plan(&plan, &grid, &ModuleSettings::named("Test")).unwrap();
        let bytes = module.to_bytes().unwrap();

        let summary = read_summary(&bytes).unwrap();
        assert_eq!(summary.song_name, "Test");
        assert_eq!(summary.tracker_name, XM_TRACKER_NAME);
        assert_eq!(summary.num_patterns, 4);
        assert_eq!(summary.num_instruments, 0);
        assert_eq!(summary.trailing_bytes, 0);
    }
}
