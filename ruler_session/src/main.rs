//! Headless host driver.
//!
//! Usage:
//!   cargo run -p ruler_session -- [--config ruler.json] [--unit cm] [--mode line]
//!
//! Simulates the AR host: console lines stand in for hit tests and button
//! presses, a fixed-rate loop stands in for scene update callbacks, and host
//! events are logged instead of rendered.
//!
//! Console commands:
//!   target <x> <y> <z> - Hit test reports this world point from now on
//!   lost               - Hit test reports nothing
//!   place              - Place a point at the live target
//!   tap <x> <y> <z>    - Place a point at an explicit hit
//!   reset              - Clear the measurement
//!   mode               - Toggle line / circle
//!   unit               - Cycle cm / in / m / ft
//!   status             - Show session status
//!   quit               - Exit

use std::env;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context};
use ruler_session::{
    input::{parse_line, DriverCommand},
    MeasureSession, Measurement,
};
use ruler_shared::{
    config::MeasureConfig,
    math::Point3,
    render::{SceneSink, VisualSink},
    units::{LengthUnit, MeasureMode},
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

fn parse_args() -> anyhow::Result<MeasureConfig> {
    let args: Vec<String> = env::args().collect();

    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a path")?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config {path}"))?;
            MeasureConfig::from_json_str(&text)
                .with_context(|| format!("parse config {path}"))?
        }
        None => MeasureConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--unit" if i + 1 < args.len() => {
                cfg.unit = match LengthUnit::parse(&args[i + 1]) {
                    Some(unit) => unit,
                    None => bail!("unknown unit {:?}", args[i + 1]),
                };
                i += 2;
            }
            "--mode" if i + 1 < args.len() => {
                cfg.mode = match MeasureMode::parse(&args[i + 1]) {
                    Some(mode) => mode,
                    None => bail!("unknown mode {:?}", args[i + 1]),
                };
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(cfg)
}

/// Forwards queued host events to the sink.
fn flush_host_events(session: &mut MeasureSession, sink: &mut impl VisualSink) {
    for attach in session.drain_attach_requests() {
        debug!(anchor = attach.anchor.0, point = ?attach.point, "Attach anchor");
    }
    for directive in session.drain_visuals() {
        debug!(handle = directive.handle.0, op = ?directive.op, "Visual directive");
        sink.apply(&directive);
    }
    for detach in session.drain_detach_requests() {
        debug!(anchor = detach.anchor.0, "Detach anchor");
    }
}

fn readout(session: &mut MeasureSession) -> String {
    let hint = session.hint();
    let label = session.metric_label();
    let header = format!("[{} {}]", session.mode_label(), session.unit_label());
    match session.value_text() {
        Some(value) => format!("{header} {label}: {value} | {hint}"),
        None => format!("{header} {hint}"),
    }
}

fn status(session: &MeasureSession, sink: &SceneSink) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("State: {:?}", session.state()));
    out.push(format!("Mode: {}", session.mode_label()));
    out.push(format!("Unit: {}", session.unit_label()));
    out.push(format!("Samples: {}", session.samples().len()));
    for sample in session.samples() {
        out.push(format!("  #{} at {:?}", sample.anchor.0, sample.point));
    }
    match session.result() {
        Some(Measurement::Distance(d)) => out.push(format!("Distance: {d:.4} m")),
        Some(Measurement::Circle(c)) => {
            out.push(format!("Center: {:?}", c.center));
            out.push(format!(
                "Radius: {:.4} m, circumference: {:.4} m",
                c.radius,
                c.circumference()
            ));
        }
        Some(Measurement::Degenerate) => out.push("Result: points are collinear".into()),
        None => {}
    }
    out.push(format!("Visuals alive: {}", sink.live_count()));
    let s = session.formatter_stats();
    out.push(format!("Cache: {} hits, {} misses", s.hits, s.misses));
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    info!(mode = %cfg.mode, unit = %cfg.unit, frame_hz = cfg.frame_hz, "Starting session");

    let mut session = MeasureSession::new(&cfg);
    let mut sink = SceneSink::default();
    let mut target: Option<Point3> = None;

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!(
        "Session ready. Type 'target <x> <y> <z>' then 'place', 'status' for info, 'quit' to exit."
    );
    println!();

    let frame_interval = Duration::from_secs_f32(1.0 / cfg.frame_hz.max(1) as f32);
    let mut last_readout = String::new();

    loop {
        // One console line per frame, like a tap between scene updates.
        match console_rx.try_recv() {
            Ok(line) => match parse_line(&line) {
                Ok(Some(DriverCommand::Target(point))) => target = Some(point),
                Ok(Some(DriverCommand::Lost)) => target = None,
                Ok(Some(DriverCommand::Action(action))) => match session.handle_action(action) {
                    Ok(outcome) => info!(?outcome, "Action applied"),
                    Err(e) => println!("{e}"),
                },
                Ok(Some(DriverCommand::Status)) => {
                    for line in status(&session, &sink) {
                        println!("{line}");
                    }
                }
                Ok(Some(DriverCommand::Quit)) => break,
                Ok(None) => {}
                Err(e) => println!("Error: {e:#}"),
            },
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        session.update_frame(target);
        flush_host_events(&mut session, &mut sink);

        let text = readout(&mut session);
        if text != last_readout {
            println!("{text}");
            last_readout = text;
        }

        tokio::time::sleep(frame_interval).await;
    }

    Ok(())
}
