//! Shared rendering module for the board view
//!
//! Platform-agnostic layout, camera and edge logic. A presentation layer
//! plugs in through the [`scene::Scene`] trait.
//!
//! # Modules
//!
//! - `theme`: CSS class names and user-facing strings as Rust constants
//! - `layout`: Seed, auto-arrange, settle and glide over node positions
//! - `camera`: Pan/zoom transform of the world container
//! - `render`: Edge routing, focus and abstract render commands
//! - `scene`: Presentation boundary and the headless scene

pub mod camera;
pub mod layout;
pub mod render;
pub mod scene;
pub mod theme;

pub use camera::*;
pub use layout::*;
pub use render::*;
pub use scene::*;
