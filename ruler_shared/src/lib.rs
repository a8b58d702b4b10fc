//! `ruler_shared`
//!
//! Shared libraries used by the measuring session and its hosts.
//!
//! Design goals:
//! - Deterministic and allocation-light on the per-frame path.
//! - Clear separation of concerns (math, geometry, units, formatting, events).
//! - Traits for abstraction where the host plugs in.
//! - No `unsafe`.

pub mod config;
pub mod event;
pub mod format;
pub mod geometry;
pub mod math;
pub mod render;
pub mod units;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::event::*;
    pub use crate::format::*;
    pub use crate::geometry::*;
    pub use crate::math::*;
    pub use crate::render::*;
    pub use crate::units::*;
}
