//! Session implementation.
//!
//! The session maintains:
//! - The committed samples of the current measurement
//! - The live target reported by the host each frame
//! - The active mode, unit and the locked result
//! - Every visual handle it asked the host to draw
//! - An outbox of host events (visual directives, anchor requests)
//!
//! All mutation goes through [`MeasureSession::update_frame`] and
//! [`MeasureSession::handle_action`]; the host serializes those calls.

use ruler_shared::{
    config::{CirclePreview, MeasureConfig},
    event::{AnchorId, AttachRequest, DetachRequest, EventBus, Sample},
    format::{DistanceFormatter, FormatterStats},
    geometry::{circle_from_three_points_with, distance, CircleResult, CollinearTolerance},
    math::{Point3, Vec3},
    render::{Visual, VisualDirective, VisualHandle, VisualOp},
    units::{LengthUnit, MeasureMode},
};
use tracing::{debug, info, warn};

use crate::{error::ActionError, input::UserAction, readout::Hint};

/// Measurement progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing placed, no surface under the reticle.
    Idle,
    /// Nothing placed, a surface is being tracked.
    AwaitingFirstPoint,
    /// Some but not all samples placed; the live target is tracked.
    Live,
    /// All samples placed; the result is fixed until reset.
    Locked,
}

/// Result of a locked measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Distance(f32),
    Circle(CircleResult),
    /// Circle input was collinear; no circle exists.
    Degenerate,
}

impl Measurement {
    /// Value shown to the user, in meters: the distance or the diameter.
    pub fn display_meters(&self) -> Option<f32> {
        match self {
            Measurement::Distance(d) => Some(*d),
            Measurement::Circle(c) => Some(c.diameter()),
            Measurement::Degenerate => None,
        }
    }
}

/// What a frame update observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStatus {
    pub state: SessionState,
    pub has_target: bool,
    /// In-progress metric in meters, when the mode defines one.
    pub live_distance: Option<f32>,
    pub hint: Hint,
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Placed {
        sample: Sample,
        placed: usize,
        required: usize,
    },
    Locked {
        sample: Sample,
        measurement: Measurement,
    },
    Cleared {
        detached: usize,
    },
    ModeSwitched {
        mode: MeasureMode,
        detached: usize,
    },
    UnitCycled(LengthUnit),
}

/// Frame-driven measuring session.
pub struct MeasureSession {
    mode: MeasureMode,
    unit: LengthUnit,
    state: SessionState,

    up: Vec3,
    marker_radius: f32,
    collinear: CollinearTolerance,
    circle_preview: CirclePreview,

    samples: Vec<Sample>,
    live_target: Option<Point3>,
    live_distance: Option<f32>,
    result: Option<Measurement>,

    /// One marker per sample, same order.
    markers: Vec<VisualHandle>,
    /// Connector following the live target.
    provisional: Option<VisualHandle>,
    /// Visuals created on lock.
    finals: Vec<VisualHandle>,

    next_anchor: u64,
    next_visual: u64,

    formatter: DistanceFormatter,
    outbox: EventBus,
}

impl Default for MeasureSession {
    fn default() -> Self {
        Self::new(&MeasureConfig::default())
    }
}

impl MeasureSession {
    pub fn new(cfg: &MeasureConfig) -> Self {
        Self {
            mode: cfg.mode,
            unit: cfg.unit,
            state: SessionState::Idle,
            up: cfg.up,
            marker_radius: cfg.marker_radius,
            collinear: cfg.collinear,
            circle_preview: cfg.circle_preview,
            samples: Vec::with_capacity(MeasureMode::Circle.required_points()),
            live_target: None,
            live_distance: None,
            result: None,
            markers: Vec::new(),
            provisional: None,
            finals: Vec::new(),
            next_anchor: 1,
            next_visual: 1,
            formatter: DistanceFormatter::new(),
            outbox: EventBus::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> MeasureMode {
        self.mode
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn live_target(&self) -> Option<Point3> {
        self.live_target
    }

    pub fn live_distance(&self) -> Option<f32> {
        self.live_distance
    }

    /// Locked result, if any.
    pub fn result(&self) -> Option<Measurement> {
        self.result
    }

    /// Per-frame entry point. `live_target` is this frame's hit-test point.
    pub fn update_frame(&mut self, live_target: Option<Point3>) -> FrameStatus {
        self.live_target = live_target.filter(|p| p.is_finite());

        match self.state {
            SessionState::Idle | SessionState::AwaitingFirstPoint => {
                let next = if self.live_target.is_some() {
                    SessionState::AwaitingFirstPoint
                } else {
                    SessionState::Idle
                };
                if next != self.state {
                    debug!(from = ?self.state, to = ?next, "Surface tracking changed");
                    self.state = next;
                }
            }
            SessionState::Live => {
                // Without a target the last provisional visual stays as is.
                if let Some(target) = self.live_target {
                    self.update_preview(target);
                }
            }
            SessionState::Locked => {}
        }

        FrameStatus {
            state: self.state,
            has_target: self.live_target.is_some(),
            live_distance: self.live_distance,
            hint: self.hint(),
        }
    }

    /// Action entry point.
    pub fn handle_action(&mut self, action: UserAction) -> Result<ActionOutcome, ActionError> {
        match action {
            UserAction::PlacePoint => {
                self.ensure_open()?;
                let target = self.live_target.ok_or(ActionError::NoTarget)?;
                Ok(self.place(target))
            }
            UserAction::TapPlace(point) => {
                self.ensure_open()?;
                if !point.is_finite() {
                    return Err(ActionError::NoTarget);
                }
                Ok(self.place(point))
            }
            UserAction::Reset => {
                let detached = self.clear();
                info!(detached, "Measurement cleared");
                Ok(ActionOutcome::Cleared { detached })
            }
            UserAction::SwitchMode => {
                let detached = self.clear();
                self.mode = self.mode.next();
                info!(mode = %self.mode, detached, "Mode switched");
                Ok(ActionOutcome::ModeSwitched {
                    mode: self.mode,
                    detached,
                })
            }
            UserAction::CycleUnit => {
                self.unit = self.unit.next();
                info!(unit = %self.unit, "Unit changed");
                Ok(ActionOutcome::UnitCycled(self.unit))
            }
        }
    }

    fn ensure_open(&self) -> Result<(), ActionError> {
        let required = self.mode.required_points();
        if self.state == SessionState::Locked || self.samples.len() >= required {
            debug!(mode = %self.mode, required, "Placement rejected, measurement locked");
            return Err(ActionError::AlreadyLocked {
                mode: self.mode,
                required,
            });
        }
        Ok(())
    }

    fn place(&mut self, point: Point3) -> ActionOutcome {
        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        let sample = Sample { anchor, point };

        self.samples.push(sample);
        self.outbox.push(AttachRequest { anchor, point });
        let marker = self.create_visual(Visual::marker(point, self.marker_radius));
        self.markers.push(marker);

        let placed = self.samples.len();
        let required = self.mode.required_points();
        info!(anchor = anchor.0, placed, required, mode = %self.mode, "Sample placed");

        if placed >= required {
            let measurement = self.lock();
            ActionOutcome::Locked {
                sample,
                measurement,
            }
        } else {
            self.state = SessionState::Live;
            // The preview origin may have moved to the new sample.
            match self.live_target {
                Some(target) => self.update_preview(target),
                None => self.drop_preview(),
            }
            ActionOutcome::Placed {
                sample,
                placed,
                required,
            }
        }
    }

    /// Start point of the live connector, if this mode previews at all.
    fn preview_origin(&self) -> Option<Point3> {
        match (self.mode, self.circle_preview) {
            (MeasureMode::Line, _) => self.samples.first().map(|s| s.point),
            (MeasureMode::Circle, CirclePreview::Chord) => self.samples.last().map(|s| s.point),
            (MeasureMode::Circle, CirclePreview::Suppress) => None,
        }
    }

    fn update_preview(&mut self, target: Point3) {
        let Some(origin) = self.preview_origin() else {
            return;
        };
        let d = distance(origin, target);
        self.live_distance = Some(d);

        let visual = Visual::connector(origin, target, self.up);
        match self.provisional {
            Some(handle) => self.outbox.push(VisualDirective {
                handle,
                op: VisualOp::Update(visual),
            }),
            None => self.provisional = Some(self.create_visual(visual)),
        }
        debug!(distance = d, "Live preview updated");
    }

    fn drop_preview(&mut self) {
        if let Some(handle) = self.provisional.take() {
            self.destroy_visual(handle);
        }
        self.live_distance = None;
    }

    fn lock(&mut self) -> Measurement {
        self.drop_preview();

        let measurement = match self.mode {
            MeasureMode::Line => {
                let (a, b) = (self.samples[0].point, self.samples[1].point);
                let connector = self.create_visual(Visual::connector(a, b, self.up));
                self.finals.push(connector);
                Measurement::Distance(distance(a, b))
            }
            MeasureMode::Circle => {
                let [p1, p2, p3] = [0, 1, 2].map(|i| self.samples[i].point);
                match circle_from_three_points_with(p1, p2, p3, self.collinear) {
                    Some(circle) => {
                        let center_marker = Visual::marker(circle.center, self.marker_radius);
                        let radius_connector = Visual::connector(circle.center, p1, self.up);
                        let center = self.create_visual(center_marker);
                        let radius = self.create_visual(radius_connector);
                        self.finals.extend([center, radius]);
                        Measurement::Circle(circle)
                    }
                    None => {
                        warn!(?p1, ?p2, ?p3, "Circle points are collinear");
                        Measurement::Degenerate
                    }
                }
            }
        };

        self.result = Some(measurement);
        self.state = SessionState::Locked;
        info!(mode = %self.mode, ?measurement, "Measurement locked");
        measurement
    }

    /// Detaches every sample and destroys every owned visual. Returns the
    /// number of detach requests issued.
    fn clear(&mut self) -> usize {
        let detached = self.samples.len();
        for sample in std::mem::take(&mut self.samples) {
            self.outbox.push(DetachRequest {
                anchor: sample.anchor,
            });
        }

        let handles: Vec<VisualHandle> = std::mem::take(&mut self.markers)
            .into_iter()
            .chain(self.provisional.take())
            .chain(std::mem::take(&mut self.finals))
            .collect();
        for handle in handles {
            self.destroy_visual(handle);
        }

        self.live_target = None;
        self.live_distance = None;
        self.result = None;
        self.state = SessionState::Idle;
        detached
    }

    fn create_visual(&mut self, visual: Visual) -> VisualHandle {
        let handle = VisualHandle(self.next_visual);
        self.next_visual += 1;
        self.outbox.push(VisualDirective {
            handle,
            op: VisualOp::Create(visual),
        });
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.outbox.push(VisualDirective {
            handle,
            op: VisualOp::Destroy,
        });
    }

    // ─── Readouts ───

    /// Metric currently on display, in meters.
    pub fn display_meters(&self) -> Option<f32> {
        match self.state {
            SessionState::Locked => self.result.and_then(|m| m.display_meters()),
            SessionState::Live => self.live_distance,
            _ => None,
        }
    }

    /// Formatted metric in the current unit, e.g. `"12.3 cm"`.
    pub fn value_text(&mut self) -> Option<&str> {
        let meters = self.display_meters()?;
        Some(self.formatter.format_length(meters, self.unit))
    }

    pub fn formatter_stats(&self) -> FormatterStats {
        self.formatter.stats()
    }

    /// Caption for [`Self::value_text`].
    pub fn metric_label(&self) -> &'static str {
        match (self.mode, self.state) {
            (MeasureMode::Circle, SessionState::Locked) => "Diameter",
            _ => "Distance",
        }
    }

    pub fn hint(&self) -> Hint {
        match self.state {
            SessionState::Locked => match self.result {
                Some(Measurement::Degenerate) => Hint::Collinear,
                _ => Hint::ResetToMeasureAgain,
            },
            _ if self.live_target.is_none() => Hint::FindSurface,
            SessionState::Idle | SessionState::AwaitingFirstPoint => Hint::TapToStart,
            SessionState::Live => Hint::PlaceNext {
                placed: self.samples.len(),
                required: self.mode.required_points(),
            },
        }
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn unit_label(&self) -> &'static str {
        self.unit.label()
    }

    // ─── Host outbox ───

    pub fn drain_visuals(&mut self) -> Vec<VisualDirective> {
        self.outbox.drain()
    }

    pub fn drain_attach_requests(&mut self) -> Vec<AttachRequest> {
        self.outbox.drain()
    }

    pub fn drain_detach_requests(&mut self) -> Vec<DetachRequest> {
        self.outbox.drain()
    }
}
