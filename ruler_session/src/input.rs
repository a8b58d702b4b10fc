//! Input handling.
//!
//! The host pushes two kinds of input into the session: the per-frame live
//! target (a hit-test point or nothing) and discrete user actions. The driver
//! binary also reads them as console lines, parsed here.

use anyhow::{bail, Context};
use ruler_shared::math::Point3;

/// Discrete user action, delivered between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserAction {
    /// Commit the current live target as a sample.
    PlacePoint,
    /// Commit an explicit hit point (tap on a plane).
    TapPlace(Point3),
    Reset,
    /// Toggle Line/Circle; implies a reset.
    SwitchMode,
    /// Advance CM -> IN -> M -> FT.
    CycleUnit,
}

/// One parsed driver console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverCommand {
    /// Simulated hit-test result for the following frames.
    Target(Point3),
    /// Hit test finds nothing from now on.
    Lost,
    Action(UserAction),
    Status,
    Quit,
}

fn parse_point(args: &[&str]) -> anyhow::Result<Point3> {
    if args.len() != 3 {
        bail!("expected <x> <y> <z>, got {} values", args.len());
    }
    let mut xyz = [0.0f32; 3];
    for (slot, raw) in xyz.iter_mut().zip(args) {
        *slot = raw
            .parse()
            .with_context(|| format!("invalid coordinate {raw:?}"))?;
    }
    Ok(Point3::new(xyz[0], xyz[1], xyz[2]))
}

/// Parses a console line; blank lines and `//` comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<DriverCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return Ok(None);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let cmd = match tokens[0] {
        "target" => DriverCommand::Target(parse_point(&tokens[1..])?),
        "lost" => DriverCommand::Lost,
        "place" => DriverCommand::Action(UserAction::PlacePoint),
        "tap" => DriverCommand::Action(UserAction::TapPlace(parse_point(&tokens[1..])?)),
        "reset" | "clear" => DriverCommand::Action(UserAction::Reset),
        "mode" => DriverCommand::Action(UserAction::SwitchMode),
        "unit" => DriverCommand::Action(UserAction::CycleUnit),
        "status" => DriverCommand::Status,
        "quit" | "exit" => DriverCommand::Quit,
        other => bail!("unknown command: {other}"),
    };
    Ok(Some(cmd))
}
