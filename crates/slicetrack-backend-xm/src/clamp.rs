//! Value-range policy for committed cells.
//!
//! Out-of-range values are clamped or masked, never rejected. Callers may
//! hand in loosely validated plans and still get a module out.

/// Lowest playable note number.
pub const NOTE_MIN: u8 = 1;

/// Highest playable note number (B-7).
pub const NOTE_MAX: u8 = 96;

/// Full volume in the volume column.
pub const VOLUME_MAX: u8 = 64;

/// Clamp a planner pitch into `NOTE_MIN..=NOTE_MAX`.
pub fn clamp_note(pitch: i32) -> u8 {
    pitch.clamp(NOTE_MIN as i32, NOTE_MAX as i32) as u8
}

/// Clamp a volume into `0..=VOLUME_MAX`.
pub fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, VOLUME_MAX as i32) as u8
}

/// Keep the low byte of a wider field.
pub fn mask_byte(value: u32) -> u8 {
    (value & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_note() {
        assert_eq!(clamp_note(60), 60);
        assert_eq!(clamp_note(130), 96);
        assert_eq!(clamp_note(96), 96);
        assert_eq!(clamp_note(97), 96);
        assert_eq!(clamp_note(1), 1);
        assert_eq!(clamp_note(0), 1);
        assert_eq!(clamp_note(-12), 1);
        assert_eq!(clamp_note(i32::MIN), 1);
        assert_eq!(clamp_note(i32::MAX), 96);
    }

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(64), 64);
        assert_eq!(clamp_volume(65), 64);
        assert_eq!(clamp_volume(-1), 0);
        assert_eq!(clamp_volume(32), 32);
    }

    #[test]
    fn test_mask_byte() {
        assert_eq!(mask_byte(1), 1);
        assert_eq!(mask_byte(255), 255);
        assert_eq!(mask_byte(256), 0);
        assert_eq!(mask_byte(257), 1);
        assert_eq!(mask_byte(0x1234), 0x34);
    }
}
