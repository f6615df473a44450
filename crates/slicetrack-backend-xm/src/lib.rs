//! SliceTrack XM Backend - Pattern Grids and Deterministic XM Encoding
//!
//! This crate turns a [`RemixPlan`](slicetrack_plan::RemixPlan) into a
//! tracker module:
//!
//! 1. [`build_grid`] lays the plan's notes out as pattern x row x channel
//!    cells, clamping every value through the [`clamp`] policy.
//! 2. [`XmModule`](xm::XmModule) packs the grid and borrows the plan's PCM.
//! 3. [`encode`], [`encode_to`] or [`export_to_path`] serialize it.
//!
//! # Determinism
//!
//! Given the same plan and settings, the output is byte-identical. There is
//! no timestamp, randomness or platform-dependent field in the format.
//!
//! # Example
//!
//! ```
//! use slicetrack_backend_xm::{encode_plan, xm::ModuleSettings};
//! use slicetrack_plan::{plan, PlannerConfig, PreloadedSamples, SampleBuffer, Slice};
//!
//! let slices = vec![Slice::new(0.0, 0.25).unwrap()];
//! let mut samples = PreloadedSamples::new(vec![SampleBuffer::new(vec![0; 64], 22050)]);
//! let remix = plan(&slices, &mut samples, None, &PlannerConfig::default()).unwrap();
//!
//! let bytes = encode_plan(&remix, &ModuleSettings::named("demo")).unwrap();
//! assert_eq!(&bytes[0..17], b"Extended Module: ");
//! ```
//!
//! # Module Structure
//!
//! - [`clamp`]: value-range policy applied when cells are committed
//! - [`grid`]: `Cell`, `Pattern`, `PatternGrid` and `build_grid`
//! - [`xm`]: header, pattern and instrument writers plus the read-back parser
//! - [`export`]: byte, sink and file entry points

pub mod clamp;
pub mod error;
pub mod export;
pub mod grid;
pub mod xm;

pub use error::EncodeError;
pub use export::{encode, encode_plan, encode_to, export_to_path, ExportReport};
pub use grid::{build_grid, Cell, GridError, Pattern, PatternGrid};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "slicetrack-backend-xm";
