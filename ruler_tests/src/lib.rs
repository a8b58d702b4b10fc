//! Test harness for driving a [`MeasureSession`] the way an AR host would.
//!
//! [`ScriptedHost`] owns the session plus a recording visual sink and an
//! anchor table. Every call runs one host step: feed input, then pump the
//! session outbox so attach/detach and visual directives are applied in
//! the order the host would see them.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use ruler_session::{
    input::{parse_line, DriverCommand},
    ActionError, ActionOutcome, FrameStatus, MeasureSession, UserAction,
};
use ruler_shared::prelude::*;
use tracing::debug;

/// Installs a test-writer subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

pub struct ScriptedHost {
    pub session: MeasureSession,
    pub sink: RecordingSink,
    /// Anchors currently attached, keyed by id.
    anchors: BTreeMap<AnchorId, Point3>,
    attach_count: usize,
    detach_count: usize,
    /// Simulated hit-test result fed on every frame.
    pub target: Option<Point3>,
}

impl ScriptedHost {
    pub fn new(cfg: &MeasureConfig) -> Self {
        Self {
            session: MeasureSession::new(cfg),
            sink: RecordingSink::default(),
            anchors: BTreeMap::new(),
            attach_count: 0,
            detach_count: 0,
            target: None,
        }
    }

    /// Aims the reticle at `target` and runs a frame.
    pub fn aim(&mut self, target: Option<Point3>) -> FrameStatus {
        self.target = target;
        self.frame()
    }

    /// Runs one frame with the current target.
    pub fn frame(&mut self) -> FrameStatus {
        let status = self.session.update_frame(self.target);
        self.pump();
        status
    }

    pub fn act(&mut self, action: UserAction) -> Result<ActionOutcome, ActionError> {
        let outcome = self.session.handle_action(action);
        self.pump();
        outcome
    }

    /// Aims at `point`, runs a frame and places a sample there.
    pub fn place_at(&mut self, point: Point3) -> Result<ActionOutcome, ActionError> {
        self.aim(Some(point));
        self.act(UserAction::PlacePoint)
    }

    /// Applies queued host events.
    pub fn pump(&mut self) {
        for attach in self.session.drain_attach_requests() {
            debug!(anchor = attach.anchor.0, "host attach");
            self.anchors.insert(attach.anchor, attach.point);
            self.attach_count += 1;
        }
        for directive in self.session.drain_visuals() {
            self.sink.apply(&directive);
        }
        for detach in self.session.drain_detach_requests() {
            debug!(anchor = detach.anchor.0, "host detach");
            self.anchors.remove(&detach.anchor);
            self.detach_count += 1;
        }
    }

    pub fn attached(&self) -> Vec<AnchorId> {
        self.anchors.keys().copied().collect()
    }

    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    pub fn detach_count(&self) -> usize {
        self.detach_count
    }

    /// Runs driver console lines, one frame after each. Returns the
    /// readout text after the last line.
    pub fn run_script(&mut self, script: &str) -> anyhow::Result<Option<String>> {
        for (n, line) in script.lines().enumerate() {
            let cmd = parse_line(line).with_context(|| format!("line {}", n + 1))?;
            match cmd {
                Some(DriverCommand::Target(p)) => self.target = Some(p),
                Some(DriverCommand::Lost) => self.target = None,
                Some(DriverCommand::Action(action)) => {
                    self.act(action)
                        .with_context(|| format!("line {}: {line}", n + 1))?;
                }
                Some(DriverCommand::Status) | None => {}
                Some(DriverCommand::Quit) => break,
            }
            self.frame();
        }
        if self.sink.live_count() < self.session.samples().len() {
            bail!("fewer live visuals than placed samples");
        }
        Ok(self.session.value_text().map(str::to_owned))
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new(&MeasureConfig::default())
    }
}
