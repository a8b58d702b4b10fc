//! End-to-end session flows through a scripted host.

use ruler_session::{
    ActionError, ActionOutcome, Hint, MeasureSession, Measurement, SessionState, UserAction,
};
use ruler_shared::{
    config::{CirclePreview, MeasureConfig},
    event::AnchorId,
    geometry::{distance, CollinearTolerance},
    math::Point3,
    render::{SceneSink, VisualKind, VisualSink},
    units::MeasureMode,
};
use ruler_tests::{init_tracing, ScriptedHost};

fn p(x: f32, y: f32, z: f32) -> Point3 {
    Point3::new(x, y, z)
}

fn circle_host(preview: CirclePreview) -> ScriptedHost {
    ScriptedHost::new(&MeasureConfig {
        mode: MeasureMode::Circle,
        circle_preview: preview,
        ..MeasureConfig::default()
    })
}

#[test]
fn line_goes_idle_live_locked() -> anyhow::Result<()> {
    init_tracing();
    let mut host = ScriptedHost::default();
    let (a, b) = (p(0.1, 0.0, -0.5), p(0.4, 0.2, -0.7));

    assert_eq!(host.frame().state, SessionState::Idle);
    assert_eq!(host.aim(Some(a)).state, SessionState::AwaitingFirstPoint);

    host.act(UserAction::PlacePoint)?;
    assert_eq!(host.session.state(), SessionState::Live);

    let status = host.aim(Some(b));
    assert_eq!(status.live_distance, Some(distance(a, b)));
    assert_eq!(
        status.hint,
        Hint::PlaceNext {
            placed: 1,
            required: 2
        }
    );
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);

    host.act(UserAction::PlacePoint)?;
    assert_eq!(host.session.state(), SessionState::Locked);
    assert_eq!(
        host.session.result(),
        Some(Measurement::Distance(distance(a, b)))
    );
    assert_eq!(host.attached(), vec![AnchorId(1), AnchorId(2)]);
    assert_eq!(host.sink.count_kind(VisualKind::Marker), 2);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);
    Ok(())
}

#[test]
fn third_line_point_is_invalid_and_changes_nothing() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(0.0, 0.0, 1.0))?;
    let visuals_before = host.sink.history.len();

    let err = host.place_at(p(0.0, 0.0, 2.0)).unwrap_err();
    assert!(err.is_invalid_action());
    assert_eq!(err.to_string(), "max points reached for LINE mode (2)");
    assert_eq!(host.session.state(), SessionState::Locked);
    assert_eq!(host.session.samples().len(), 2);
    assert_eq!(host.attach_count(), 2);
    assert_eq!(host.sink.history.len(), visuals_before);
    assert_eq!(host.session.result(), Some(Measurement::Distance(1.0)));
    Ok(())
}

#[test]
fn place_without_surface_is_rejected() {
    let mut host = ScriptedHost::default();
    host.aim(None);
    assert_eq!(host.act(UserAction::PlacePoint), Err(ActionError::NoTarget));
    assert_eq!(host.session.state(), SessionState::Idle);
    assert_eq!(host.session.hint(), Hint::FindSurface);
    assert_eq!(host.attach_count(), 0);
}

#[test]
fn reset_from_locked_detaches_each_sample() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(1.0, 0.0, 0.0))?;
    assert_eq!(host.sink.live_count(), 3);

    let out = host.act(UserAction::Reset)?;
    assert_eq!(out, ActionOutcome::Cleared { detached: 2 });
    assert_eq!(host.detach_count(), 2);
    assert!(host.attached().is_empty());
    assert_eq!(host.sink.live_count(), 0);
    assert_eq!(host.session.state(), SessionState::Idle);
    assert!(host.session.samples().is_empty());
    assert_eq!(host.session.value_text(), None);

    // Measuring again allocates fresh anchors.
    let out = host.place_at(p(2.0, 0.0, 0.0))?;
    assert!(matches!(
        out,
        ActionOutcome::Placed { sample, .. } if sample.anchor == AnchorId(3)
    ));
    Ok(())
}

#[test]
fn unit_cycle_returns_to_the_same_text() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(0.5, 0.0, 0.0))?;

    let original = host.session.value_text().map(str::to_owned);
    assert_eq!(original.as_deref(), Some("50.0 cm"));

    let mut seen = Vec::new();
    for _ in 0..4 {
        host.act(UserAction::CycleUnit)?;
        seen.push(host.session.value_text().map(str::to_owned));
    }
    assert_eq!(
        seen,
        vec![
            Some("19.7 in".to_string()),
            Some("0.5 m".to_string()),
            Some("1.6 ft".to_string()),
            original,
        ]
    );
    assert_eq!(host.session.result(), Some(Measurement::Distance(0.5)));
    Ok(())
}

#[test]
fn readout_hits_formatter_cache_between_frames() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.aim(Some(p(0.12, 0.0, 0.0)));
    let first = host.session.value_text().map(|s| (s.as_ptr(), s.to_owned()));

    // Sub-millimeter jitter keeps the same tenth-of-a-centimeter bucket.
    host.aim(Some(p(0.1201, 0.0, 0.0)));
    let second = host.session.value_text().map(|s| (s.as_ptr(), s.to_owned()));

    assert_eq!(first, second);
    assert_eq!(second.map(|(_, text)| text).as_deref(), Some("12.0 cm"));
    let stats = host.session.formatter_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    Ok(())
}

#[test]
fn tap_place_commits_the_hit_point() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    let out = host.act(UserAction::TapPlace(p(0.0, 1.0, 0.0)))?;
    assert!(matches!(out, ActionOutcome::Placed { placed: 1, .. }));
    assert_eq!(host.session.state(), SessionState::Live);

    let out = host.act(UserAction::TapPlace(p(0.0, 1.0, 2.0)))?;
    assert_eq!(
        out,
        ActionOutcome::Locked {
            sample: host.session.samples()[1],
            measurement: Measurement::Distance(2.0),
        }
    );
    Ok(())
}

#[test]
fn lost_surface_keeps_last_preview() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.aim(Some(p(0.0, 0.0, 0.3)));
    let status = host.aim(None);

    assert_eq!(status.state, SessionState::Live);
    assert_eq!(status.hint, Hint::FindSurface);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);
    assert_eq!(host.session.value_text(), Some("30.0 cm"));
    assert_eq!(host.act(UserAction::PlacePoint), Err(ActionError::NoTarget));
    Ok(())
}

#[test]
fn mode_switch_clears_and_changes_requirement() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    host.place_at(p(0.0, 0.0, 0.0))?;

    let out = host.act(UserAction::SwitchMode)?;
    assert_eq!(
        out,
        ActionOutcome::ModeSwitched {
            mode: MeasureMode::Circle,
            detached: 1
        }
    );
    assert_eq!(host.sink.live_count(), 0);
    assert!(host.attached().is_empty());

    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(1.0, 0.0, 0.0))?;
    assert_eq!(host.session.state(), SessionState::Live);
    assert_eq!(
        host.session.hint(),
        Hint::PlaceNext {
            placed: 2,
            required: 3
        }
    );
    Ok(())
}

#[test]
fn circle_suppresses_preview_by_default() -> anyhow::Result<()> {
    let default_preview = MeasureConfig::default().circle_preview;
    assert_eq!(default_preview, CirclePreview::Suppress);
    let mut host = circle_host(CirclePreview::default());
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(0.2, 0.0, 0.0))?;
    let status = host.aim(Some(p(0.1, 0.1, 0.0)));

    assert_eq!(status.live_distance, None);
    assert_eq!(host.session.value_text(), None);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 0);
    assert_eq!(host.session.metric_label(), "Distance");
    Ok(())
}

#[test]
fn circle_chord_preview_follows_last_sample() -> anyhow::Result<()> {
    let mut host = circle_host(CirclePreview::Chord);
    host.place_at(p(0.0, 0.0, 0.0))?;
    host.place_at(p(0.2, 0.0, 0.0))?;
    let status = host.aim(Some(p(0.2, 0.0, 0.5)));

    assert_eq!(status.live_distance, Some(0.5));
    assert_eq!(host.session.value_text(), Some("50.0 cm"));
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);
    Ok(())
}

#[test]
fn chord_restarts_from_new_sample_on_placement() -> anyhow::Result<()> {
    let mut host = circle_host(CirclePreview::Chord);
    host.act(UserAction::TapPlace(p(0.0, 0.0, 0.0)))?;
    host.aim(Some(p(0.5, 0.0, 0.0)));
    assert_eq!(host.session.value_text(), Some("50.0 cm"));

    // No frame in between: the readout already measures from the new sample.
    host.act(UserAction::TapPlace(p(0.2, 0.0, 0.0)))?;
    let live = host.session.live_distance().unwrap();
    assert!((live - 0.3).abs() < 1e-6);
    assert_eq!(host.session.value_text(), Some("30.0 cm"));
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);
    Ok(())
}

#[test]
fn chord_is_dropped_when_placing_without_a_target() -> anyhow::Result<()> {
    let mut host = circle_host(CirclePreview::Chord);
    host.act(UserAction::TapPlace(p(0.0, 0.0, 0.0)))?;
    host.aim(Some(p(0.5, 0.0, 0.0)));
    host.aim(None);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);

    host.act(UserAction::TapPlace(p(0.2, 0.0, 0.0)))?;
    assert_eq!(host.session.live_distance(), None);
    assert_eq!(host.session.value_text(), None);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 0);
    Ok(())
}

#[test]
fn circle_locks_with_center_and_radius_visuals() -> anyhow::Result<()> {
    let mut host = circle_host(CirclePreview::Chord);
    host.place_at(p(1.0, 0.0, 0.0))?;
    host.place_at(p(0.0, 1.0, 0.0))?;
    let out = host.place_at(p(-1.0, 0.0, 0.0))?;

    let ActionOutcome::Locked {
        measurement: Measurement::Circle(circle),
        ..
    } = out
    else {
        panic!("expected a locked circle, got {out:?}");
    };
    assert!(circle.center.distance(Point3::ZERO) < 1e-5);
    assert!((circle.radius - 1.0).abs() < 1e-5);

    // Three sample markers and the center marker; the chord preview is gone.
    assert_eq!(host.sink.count_kind(VisualKind::Marker), 4);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 1);
    assert_eq!(host.session.metric_label(), "Diameter");
    assert_eq!(host.session.value_text(), Some("200.0 cm"));
    Ok(())
}

#[test]
fn collinear_circle_reports_degenerate() -> anyhow::Result<()> {
    let mut host = circle_host(CirclePreview::Suppress);
    for x in [0.0, 1.0, 2.0] {
        host.place_at(p(x, 0.0, 0.0))?;
    }
    assert_eq!(host.session.state(), SessionState::Locked);
    assert_eq!(host.session.result(), Some(Measurement::Degenerate));
    assert_eq!(host.session.hint().to_string(), "Points are in a line");
    assert_eq!(host.session.value_text(), None);
    assert_eq!(host.sink.count_kind(VisualKind::Marker), 3);
    assert_eq!(host.sink.count_kind(VisualKind::Connector), 0);

    host.act(UserAction::Reset)?;
    assert_eq!(host.detach_count(), 3);
    Ok(())
}

#[test]
fn console_script_measures_a_line() -> anyhow::Result<()> {
    let mut host = ScriptedHost::default();
    let text = host.run_script(
        "// measure a 3-4-5 triangle hypotenuse\n\
         target 0 0 0\n\
         place\n\
         target 0.3 0 0.4\n\
         place\n\
         unit\n",
    )?;
    assert_eq!(text.as_deref(), Some("19.7 in"));
    Ok(())
}

#[test]
fn console_script_reports_the_failing_line() {
    let mut host = ScriptedHost::default();
    let err = host.run_script("lost\nplace\n").unwrap_err();
    assert!(format!("{err:#}").contains("line 2"));
    assert!(format!("{err:#}").contains("no surface found"));
}

#[test]
fn relative_tolerance_locks_a_centimeter_circle() -> anyhow::Result<()> {
    let corners = [p(0.0, 0.0, 0.0), p(0.01, 0.0, 0.0), p(0.0, 0.01, 0.0)];

    let mut absolute = circle_host(CirclePreview::Suppress);
    for corner in corners {
        absolute.place_at(corner)?;
    }
    assert_eq!(absolute.session.result(), Some(Measurement::Degenerate));

    let mut relative = ScriptedHost::new(&MeasureConfig {
        mode: MeasureMode::Circle,
        collinear: CollinearTolerance::Relative(1e-6),
        ..MeasureConfig::default()
    });
    for corner in corners {
        relative.place_at(corner)?;
    }
    let Some(Measurement::Circle(circle)) = relative.session.result() else {
        panic!("expected a circle, got {:?}", relative.session.result());
    };
    assert!((circle.radius - 0.005 * 2f32.sqrt()).abs() < 1e-6);
    assert_eq!(relative.session.value_text(), Some("1.4 cm"));
    assert_eq!(relative.session.hint(), Hint::ResetToMeasureAgain);
    Ok(())
}

#[test]
fn scene_stays_bounded_over_long_live_sessions() -> anyhow::Result<()> {
    let mut session = MeasureSession::default();
    let mut scene = SceneSink::default();
    session.handle_action(UserAction::TapPlace(Point3::ZERO))?;

    for i in 0..10_000 {
        session.update_frame(Some(p(0.1 + i as f32 * 1e-4, 0.0, 0.0)));
        for directive in session.drain_visuals() {
            scene.apply(&directive);
        }
    }

    // One sample marker plus the provisional connector.
    assert_eq!(scene.live_count(), 2);
    assert_eq!(scene.count_kind(VisualKind::Connector), 1);
    assert!(session.drain_visuals().is_empty());
    Ok(())
}
