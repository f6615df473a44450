//! SliceTrack CLI library.
//!
//! This crate provides the pieces behind the `slicetrack` binary: WAV
//! loading and onset-based slicing, slice and planner-config files, and the
//! `analyze`, `plan`, `export`, `preview` and `inspect` commands.

pub mod audio;
pub mod commands;
pub mod input;
