//! Tests for XM header fields and pattern encoding.
//!
//! These tests check the byte layout of the module header, order table and
//! packed pattern blocks produced from planner output.

use pretty_assertions::assert_eq;
use slicetrack_backend_xm::xm::{
    read_summary, unpack_pattern, CellPacking, ModuleSettings, XM_HEADER_BLOCK_LEN,
    XM_HEADER_SIZE, XM_MAGIC, XM_TRACKER_NAME,
};
use slicetrack_backend_xm::{build_grid, encode};
use slicetrack_plan::{NoteEvent, PlannerConfig, RemixPlan, SampleBuffer};

// =============================================================================
// Helper Functions
// =============================================================================

/// A 1x1x1 plan holding a single note at row 0.
fn single_cell_plan(pitch: i32) -> RemixPlan {
    RemixPlan {
        sample_buffers: vec![SampleBuffer::new(vec![0; 2], 22050)],
        notes: vec![NoteEvent {
            slice_index: 0,
            pitch,
            pattern_index: 0,
            row: 0,
        }],
        channel_count: 1,
        pattern_count: 1,
        rows_per_pattern: 1,
        bpm_hint: None,
    }
}

/// A 1x1x1 plan with no notes.
fn empty_cell_plan() -> RemixPlan {
    RemixPlan {
        sample_buffers: vec![],
        notes: vec![],
        channel_count: 1,
        pattern_count: 1,
        rows_per_pattern: 1,
        bpm_hint: None,
    }
}

fn encode_plan_with(plan: &RemixPlan, settings: &ModuleSettings) -> Vec<u8> {
    let grid = build_grid(plan).unwrap();
    encode(plan, &grid, settings).unwrap()
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_xm_header_id_text() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::default());
    assert_eq!(&xm[0..17], b"Extended Module: ");
    assert_eq!(XM_MAGIC.len(), 17);
}

#[test]
fn test_xm_header_song_name() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::named("My Test Song Name"));
    let name = std::str::from_utf8(&xm[17..37])
        .unwrap()
        .trim_end_matches('\0');
    assert_eq!(name, "My Test Song Name");
}

#[test]
fn test_xm_header_song_name_truncation() {
    let xm = encode_plan_with(
        &empty_cell_plan(),
        &ModuleSettings::named("This Name Is Way Too Long For XM Format"),
    );
    assert_eq!(&xm[17..37], b"This Name Is Way Too");
    assert_eq!(xm[37], 0x1A);
}

#[test]
fn test_xm_header_song_name_non_ascii() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::named("Añejo"));
    assert_eq!(&xm[17..23], b"A?ejo\0");
}

#[test]
fn test_xm_header_tracker_name_and_size() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::default());
    assert_eq!(&xm[38..58], XM_TRACKER_NAME.as_bytes());
    let header_size = u32::from_le_bytes([xm[58], xm[59], xm[60], xm[61]]);
    assert_eq!(header_size, XM_HEADER_SIZE);
    assert_eq!(header_size, 60);
}

#[test]
fn test_xm_header_counts_tempo_speed() {
    let settings = ModuleSettings {
        song_name: "t".into(),
        tempo: 140,
        speed: 3,
        cell_packing: CellPacking::Full,
    };
    let xm = encode_plan_with(&single_cell_plan(60), &settings);
    let summary = read_summary(&xm).unwrap();

    assert_eq!(summary.song_length, 1);
    assert_eq!(summary.restart_position, 0);
    assert_eq!(summary.num_channels, 1);
    assert_eq!(summary.num_patterns, 1);
    assert_eq!(summary.num_instruments, 1);
    assert_eq!(summary.flags, 0);
    assert_eq!(summary.tempo, 140);
    assert_eq!(summary.speed, 3);
}

#[test]
fn test_default_tempo_and_speed() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::default());
    let summary = read_summary(&xm).unwrap();
    assert_eq!(summary.tempo, 125);
    assert_eq!(summary.speed, 6);
}

// =============================================================================
// Order Table Tests
// =============================================================================

#[test]
fn test_order_table_length_and_padding() {
    for pattern_count in [1usize, 4, 17, 256] {
        let config = PlannerConfig {
            pattern_count,
            ..Default::default()
        };
        let plan = RemixPlan::empty(&config);
        let xm = encode_plan_with(&plan, &ModuleSettings::default());

        let order = &xm[78..78 + 256];
        assert_eq!(order.len(), 256);
        for (i, &entry) in order.iter().enumerate() {
            if i < pattern_count {
                assert_eq!(entry as usize, i);
            } else {
                assert_eq!(entry, 0);
            }
        }
    }
}

// =============================================================================
// Pattern Tests
// =============================================================================

#[test]
fn test_single_present_cell_bytes() {
    let xm = encode_plan_with(&single_cell_plan(60), &ModuleSettings::default());
    let block = &xm[XM_HEADER_BLOCK_LEN..XM_HEADER_BLOCK_LEN + 14];
    assert_eq!(
        block,
        &[9, 0, 0, 0, 1, 0, 6, 0, 0x8F, 60, 1, 64, 0, 0]
    );
}

#[test]
fn test_single_absent_cell_bytes() {
    let xm = encode_plan_with(&empty_cell_plan(), &ModuleSettings::default());
    let block = &xm[XM_HEADER_BLOCK_LEN..];
    assert_eq!(block, &[9, 0, 0, 0, 1, 0, 1, 0, 0x00]);
}

#[test]
fn test_pitch_out_of_range_is_clamped_in_output() {
    let high = encode_plan_with(&single_cell_plan(130), &ModuleSettings::default());
    assert_eq!(high[XM_HEADER_BLOCK_LEN + 9], 96);

    let low = encode_plan_with(&single_cell_plan(-3), &ModuleSettings::default());
    assert_eq!(low[XM_HEADER_BLOCK_LEN + 9], 1);
}

#[test]
fn test_default_pattern_sizes() {
    // 64 rows x 4 channels, all absent except the notes placed below.
    let config = PlannerConfig::default();
    let mut plan = RemixPlan::empty(&config);
    plan.sample_buffers = vec![SampleBuffer::new(vec![], 22050); 2];
    plan.notes = vec![
        NoteEvent {
            slice_index: 0,
            pitch: 48,
            pattern_index: 0,
            row: 0,
        },
        NoteEvent {
            slice_index: 1,
            pitch: 50,
            pattern_index: 1,
            row: 8,
        },
    ];
    let xm = encode_plan_with(&plan, &ModuleSettings::default());
    let summary = read_summary(&xm).unwrap();

    let sizes: Vec<u16> = summary.patterns.iter().map(|p| p.packed_size).collect();
    assert_eq!(sizes, vec![256 + 5, 256 + 5, 256, 256]);
    assert!(summary.patterns.iter().all(|p| p.num_rows == 64));
    assert!(summary.patterns.iter().all(|p| p.header_len == 9));

    let cells = unpack_pattern(&summary.patterns[1].packed, CellPacking::Full).unwrap();
    assert_eq!(cells.len(), 256);
    // row 8, channel 1
    let cell = cells[8 * 4 + 1].unwrap();
    assert_eq!((cell.note, cell.instrument), (50, 2));
}

#[test]
fn test_compact_packing_opt_in() {
    let settings = ModuleSettings {
        cell_packing: CellPacking::Compact,
        ..Default::default()
    };
    let xm = encode_plan_with(&single_cell_plan(60), &settings);
    let block = &xm[XM_HEADER_BLOCK_LEN..XM_HEADER_BLOCK_LEN + 12];
    assert_eq!(block, &[9, 0, 0, 0, 1, 0, 4, 0, 0x87, 60, 1, 64]);

    let empty = encode_plan_with(&empty_cell_plan(), &settings);
    assert_eq!(&empty[XM_HEADER_BLOCK_LEN + 8..], &[0x80]);
}
