//! End-to-end lifecycle scenarios for the event engine.
//!
//! These drive a single `EventsState` through the public API with a manual
//! clock, the way the world-tick loop does.

use std::sync::Arc;
use std::time::Duration;

use event_engine::{
    CreateOptions, EngineConfig, EventCatalog, EventEngine, EventsState, HistoryQuery, ManualClock,
};
use event_types::{EndReason, EventCategory, EventInstance, EventStatus, Timestamp, MS_PER_HOUR};

const T0: Timestamp = Timestamp::from_millis(1_700_000_000_000);

fn engine_at(start: Timestamp) -> (EventEngine, ManualClock) {
    let clock = ManualClock::new(start);
    let engine = EventEngine::with_clock(
        EventCatalog::builtin().expect("builtin catalog"),
        EngineConfig::default(),
        Arc::new(clock.clone()),
    );
    (engine, clock)
}

fn create_and_start(engine: &EventEngine, state: &mut EventsState, type_id: &str) -> EventInstance {
    let mut instance = engine
        .create(state, type_id, CreateOptions::new())
        .expect("known type");
    engine.start(state, &mut instance).expect("admitted");
    instance
}

/// The canonical meteor shower walkthrough.
#[test]
fn test_meteor_shower_walkthrough() {
    let (engine, clock) = engine_at(T0);
    let mut state = EventsState::new();
    let cooldown_ms = (engine.template("meteor_shower").unwrap().cooldown_hours
        * MS_PER_HOUR as f64) as u64;

    let meteor = create_and_start(&engine, &mut state, "meteor_shower");
    let id = meteor.instance_id.clone();

    assert!(engine.join(&mut state, &id, "alice").is_ok());
    assert_eq!(
        engine.join(&mut state, &id, "alice").unwrap_err().reason(),
        "already_joined"
    );

    let alice = engine.contribute(&mut state, &id, "alice", 10).unwrap();
    assert_eq!(alice.total, 10);

    let bob = engine.contribute(&mut state, &id, "bob", 10).unwrap();
    assert!(bob.auto_joined);
    assert_eq!(engine.get_participants(&state, &id), vec!["alice", "bob"]);

    let progress = engine.get_event_progress(&state, &id).unwrap();
    assert_eq!(progress.current, 20);
    assert_eq!(progress.goal, 100);
    assert_eq!(progress.percent, 20);

    clock.advance(Duration::from_secs(5 * 60));
    let ended_at = engine.now();
    engine.end(&mut state, &id, EndReason::Completed).unwrap();

    assert!(engine.get_active_events(&mut state).is_empty());
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.history()[0].status, EventStatus::Completed);
    assert!(state.history()[0].completed);
    assert_eq!(
        state.cooldown_until("meteor_shower"),
        Some(Timestamp::from_millis(ended_at.as_millis() + cooldown_ms))
    );

    // Still cooling down one second before the window closes.
    clock.set(Timestamp::from_millis(ended_at.as_millis() + cooldown_ms - 1_000));
    let mut again = engine
        .create(&mut state, "meteor_shower", CreateOptions::new())
        .unwrap();
    assert_eq!(
        engine.start(&mut state, &mut again).unwrap_err().reason(),
        "event_on_cooldown"
    );

    clock.set(Timestamp::from_millis(ended_at.as_millis() + cooldown_ms));
    let mut fresh = engine
        .create(&mut state, "meteor_shower", CreateOptions::new())
        .unwrap();
    assert!(engine.start(&mut state, &mut fresh).is_ok());
    assert_ne!(fresh.instance_id, id);
}

#[test]
fn test_admission_cap_and_type_uniqueness() {
    let (engine, _clock) = engine_at(T0);
    let mut state = EventsState::new();

    create_and_start(&engine, &mut state, "aurora_borealis");
    create_and_start(&engine, &mut state, "great_migration");

    let mut duplicate = engine
        .create(&mut state, "aurora_borealis", CreateOptions::new())
        .unwrap();
    assert_eq!(
        engine.start(&mut state, &mut duplicate).unwrap_err().reason(),
        "event_already_active"
    );

    create_and_start(&engine, &mut state, "harvest_gathering");

    let mut fourth = engine
        .create(&mut state, "vanishing_merchant", CreateOptions::new())
        .unwrap();
    assert_eq!(
        engine.start(&mut state, &mut fourth).unwrap_err().reason(),
        "max_concurrent_events_reached"
    );
    assert_eq!(engine.get_active_events(&mut state).len(), 3);
}

#[test]
fn test_expiry_sweep_on_read() {
    let (engine, clock) = engine_at(T0);
    let mut state = EventsState::new();
    let fog = create_and_start(&engine, &mut state, "whispering_fog");
    let festival = create_and_start(&engine, &mut state, "blooming_festival");

    clock.set(fog.end_time);
    // Reading by zone does not sweep.
    assert_eq!(engine.get_events_by_zone(&state, "old_forest").len(), 1);

    let active = engine.get_active_events(&mut state);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].instance_id, festival.instance_id);

    assert_eq!(state.history().len(), 1);
    let archived = &state.history()[0];
    assert_eq!(archived.instance_id, fog.instance_id);
    assert_eq!(archived.status, EventStatus::Expired);
    assert!(!archived.completed);
    assert!(engine.get_events_by_zone(&state, "old_forest").is_empty());

    clock.set(festival.end_time);
    engine.get_active_events(&mut state);
    let history = engine.get_event_history(&state, &HistoryQuery::new());
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].category, EventCategory::Nature);
}

#[test]
fn test_goal_tracking_through_completion() {
    let (engine, _clock) = engine_at(T0);
    let mut state = EventsState::new();
    // vanishing_merchant goal is 25
    let merchant = create_and_start(&engine, &mut state, "vanishing_merchant");
    let id = merchant.instance_id;

    let mut last_percent = 0;
    let mut crossed_at = None;
    for (step, player) in ["ann", "ben", "cat", "dan", "eve", "fay"].iter().enumerate() {
        let receipt = engine.contribute(&mut state, &id, player, 5).unwrap();
        let percent = engine.get_event_progress(&state, &id).unwrap().percent;
        assert!(percent >= last_percent && percent <= 100);
        last_percent = percent;
        if receipt.goal_reached && crossed_at.is_none() {
            crossed_at = Some(step);
        }
        if let Some(first) = crossed_at {
            assert!(receipt.goal_reached, "goal flag dropped after step {}", first);
        }
    }
    assert_eq!(crossed_at, Some(4));

    let archived = engine.end(&mut state, &id, EndReason::Completed).unwrap();
    assert_eq!(archived.total_contributions, 30);
    let sum: u64 = engine.contributions(&state, &id).values().sum();
    assert_eq!(sum, 30);
    assert_eq!(engine.get_event_progress(&state, &id).unwrap().percent, 100);
}

#[test]
fn test_state_is_mutated_in_place() {
    let (engine, _clock) = engine_at(T0);
    let mut state = EventsState::new();
    let parade = create_and_start(&engine, &mut state, "lantern_parade");
    engine.contribute(&mut state, &parade.instance_id, "alice", 3).unwrap();

    let held = &state;
    assert_eq!(held.active()[0].total_contributions, 3);
    assert_eq!(held.participants_of(&parade.instance_id).to_vec(), vec!["alice"]);
}
