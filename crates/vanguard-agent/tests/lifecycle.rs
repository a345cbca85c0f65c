use vanguard_agent::{AgentConfig, AgentRuntime, Observation, Pose};

fn runtime() -> AgentRuntime {
    let mut config = AgentConfig::default();
    config.map.width = 10;
    config.map.height = 10;
    AgentRuntime::build(config).unwrap()
}

fn observation(tick: u64) -> Observation {
    Observation {
        tick,
        pose: Pose {
            x: 2.5,
            y: 2.5,
            heading_deg: 0.0,
            turret_bearing_deg: 0.0,
            turret_elevation_deg: 0.0,
        },
        target: None,
        map: None,
    }
}

#[test]
fn first_action_creates_the_session() {
    let runtime = runtime();
    runtime.act("alpha", &observation(0));
    let status = runtime.status();
    assert_eq!(status.sessions.active, 1);
    assert_eq!(status.sessions.destroyed_total, 0);
}

#[test]
fn action_destroy_action_reinitializes_cleanly() {
    let runtime = runtime();

    // Drive a few ticks so the session accumulates path and command state.
    for tick in 0..5 {
        runtime.act("alpha", &observation(tick));
    }
    runtime.destroy("alpha");
    assert_eq!(runtime.status().sessions.active, 0);
    assert_eq!(runtime.status().sessions.destroyed_total, 1);

    // The same identifier re-initializes as a fresh episode, including a
    // fresh slew state: the first command is bounded by one slew step again.
    let outcome = runtime.act("alpha", &observation(100));
    assert_eq!(runtime.status().sessions.active, 1);
    let config = AgentConfig::default();
    assert!(outcome.action.movement.throttle.abs() <= config.movement.max_throttle_step + 1e-9);
    assert!(outcome.action.movement.steering.abs() <= config.movement.max_steering_step + 1e-9);
}

#[test]
fn destroy_is_idempotent_and_unknown_ids_are_ignored() {
    let runtime = runtime();
    runtime.act("alpha", &observation(0));

    runtime.destroy("alpha");
    runtime.destroy("alpha");
    runtime.destroy("never-seen");

    let status = runtime.status();
    assert_eq!(status.sessions.destroyed_total, 1);
    assert_eq!(status.sessions.active, 0);
}

#[test]
fn end_without_an_id_retires_every_live_session() {
    let runtime = runtime();
    runtime.act("alpha", &observation(0));
    runtime.act("bravo", &observation(0));
    runtime.act("charlie", &observation(0));
    runtime.destroy("charlie");

    runtime.end(None);

    let status = runtime.status();
    assert_eq!(status.sessions.active, 0);
    assert_eq!(status.sessions.ended_total, 2);
    assert_eq!(status.sessions.destroyed_total, 1);
}

#[test]
fn end_with_an_id_retires_only_that_session() {
    let runtime = runtime();
    runtime.act("alpha", &observation(0));
    runtime.act("bravo", &observation(0));

    runtime.end(Some("alpha"));

    let status = runtime.status();
    assert_eq!(status.sessions.active, 1);
    assert_eq!(status.sessions.ended_total, 1);
}

#[test]
fn sessions_are_independent() {
    let runtime = runtime();
    runtime.act("alpha", &observation(0));
    runtime.act("bravo", &observation(0));
    runtime.destroy("alpha");

    // Bravo keeps ticking, untouched by alpha's destruction.
    let outcome = runtime.act("bravo", &observation(1));
    assert!(outcome.action.movement.throttle.is_finite());
    assert_eq!(runtime.status().sessions.active, 1);
}
