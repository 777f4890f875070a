//! Snapline Core Library
//!
//! Magnet-based snapping and alignment for 2-D diagram editors: moving,
//! resizing and rotating boxes click into alignment with the grid, other
//! elements, guides, the canvas centerlines, equal spacing and equal sizes.

pub mod auto_align;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod magnet;
pub mod manager;
pub mod marker;
pub mod providers;

pub use auto_align::{AlignMode, AutoAlignConfig, MAX_ITERATIONS, auto_align};
pub use config::SnapConfig;
pub use diagram::{Diagram, Element, ElementId, Guide, GuideId, MutationBatch, SerializableColor};
pub use error::{ConfigError, ConfigResult, DiagramError, DiagramResult};
pub use geometry::{Axis, Bounds, Direction, Line, Range};
pub use magnet::{DistancePair, Magnet, MagnetKind, MagnetType, MatchingMagnetPair};
pub use manager::{SnapManager, SnapResult};
pub use marker::{SnapMarker, SnapMarkers};
pub use providers::{SnapProvider, SnapProviders};
