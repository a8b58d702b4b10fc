//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend. The
//! session describes what should be on screen as directives keyed by
//! [`VisualHandle`]; a host sink instances the actual primitives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{distance, midpoint},
    math::{Point3, Quat, Vec3},
};

/// Session-allocated id for one on-screen visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    /// Small sphere at a sample or circle center.
    Marker,
    /// Thin elongated primitive between two points.
    Connector,
}

/// Placement of a visual in world space.
///
/// Connectors are centered on `position`, oriented so the local -Z axis runs
/// from start to end, and `scale` is their length in meters. Markers carry
/// their radius in `scale` and no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub kind: VisualKind,
    pub position: Point3,
    pub rotation: Option<Quat>,
    pub scale: Option<f32>,
}

impl Visual {
    pub fn marker(position: Point3, radius: f32) -> Self {
        Self {
            kind: VisualKind::Marker,
            position,
            rotation: None,
            scale: Some(radius),
        }
    }

    pub fn connector(start: Point3, end: Point3, up: Vec3) -> Self {
        Self {
            kind: VisualKind::Connector,
            position: midpoint(start, end),
            rotation: Some(Quat::look_rotation(end - start, up)),
            scale: Some(distance(start, end)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VisualOp {
    Create(Visual),
    Update(Visual),
    Destroy,
}

/// Lifecycle instruction for one visual handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualDirective {
    pub handle: VisualHandle,
    pub op: VisualOp,
}

/// Something that turns directives into pixels.
pub trait VisualSink {
    fn apply(&mut self, directive: &VisualDirective);
}

/// The set of visuals currently alive, keyed by handle.
///
/// Memory is bounded by the live visual count, so long-running hosts can
/// apply per-frame updates indefinitely.
#[derive(Debug, Default)]
pub struct SceneSink {
    live: HashMap<VisualHandle, Visual>,
}

impl SceneSink {
    pub fn live(&self) -> impl Iterator<Item = (VisualHandle, &Visual)> {
        self.live.iter().map(|(h, v)| (*h, v))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&Visual> {
        self.live.get(&handle)
    }

    /// Live visuals of one kind.
    pub fn count_kind(&self, kind: VisualKind) -> usize {
        self.live.values().filter(|v| v.kind == kind).count()
    }
}

impl VisualSink for SceneSink {
    fn apply(&mut self, directive: &VisualDirective) {
        match directive.op {
            VisualOp::Create(v) | VisualOp::Update(v) => {
                self.live.insert(directive.handle, v);
            }
            VisualOp::Destroy => {
                self.live.remove(&directive.handle);
            }
        }
    }
}

/// A [`SceneSink`] that also keeps every directive it was given. Grows with
/// each frame; meant for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub history: Vec<VisualDirective>,
    scene: SceneSink,
}

impl RecordingSink {
    pub fn live_count(&self) -> usize {
        self.scene.live_count()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&Visual> {
        self.scene.get(handle)
    }

    pub fn count_kind(&self, kind: VisualKind) -> usize {
        self.scene.count_kind(kind)
    }
}

impl VisualSink for RecordingSink {
    fn apply(&mut self, directive: &VisualDirective) {
        self.history.push(*directive);
        self.scene.apply(directive);
    }
}
