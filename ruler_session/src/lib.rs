//! `ruler_session`
//!
//! Measurement session systems:
//! - Frame-driven live target tracking
//! - Point placement and the idle / live / locked state machine
//! - Line distance and three-point circle results
//! - Unit cycling and cached display strings
//! - Host outbox for visuals and anchors

pub mod error;
pub mod input;
pub mod readout;
pub mod session;

pub use error::ActionError;
pub use input::UserAction;
pub use readout::Hint;
pub use session::{ActionOutcome, FrameStatus, MeasureSession, Measurement, SessionState};
