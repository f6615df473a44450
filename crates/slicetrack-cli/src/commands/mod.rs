//! Command implementations for the SliceTrack CLI

pub mod analyze;
pub mod export;
pub mod inspect;
pub mod json_output;
pub mod plan;
pub mod preview;
