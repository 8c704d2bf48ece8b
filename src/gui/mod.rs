//! Board graph view
//!
//! The view is headless: it drives layout, edges, focus and panels through
//! render commands, and a pluggable scene turns those into pixels.

/// Shared rendering module for platform-agnostic graph visualization
pub mod shared;

pub mod view;

pub use view::{
    ConnectMode, FrameScheduler, GraphView, NoPersist, RunPersister, Selection, ViewError,
};
