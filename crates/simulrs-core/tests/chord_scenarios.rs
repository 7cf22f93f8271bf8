// Simulrs Chord Scenarios
//
// Drives the chord engine with deterministic timers: `expire` stands in for
// the threshold elapsing, so every interleaving can be replayed exactly.
//
// Run with: cargo test -p simulrs-core --test chord_scenarios

use std::sync::Arc;

use simulrs_core::input::EV_SYN;
use simulrs_core::{
    Action, ChordEngine, ChordTimers, Key, KeyTable, ManualTimers, RawInputEvent, RecordingSink,
    TargetState,
};

const ESC: Key = Key(1);
const A: Key = Key(30);
const X: Key = Key(45);
const J: Key = Key(36);
const K: Key = Key(37);
const L: Key = Key(38);

type Engine = ChordEngine<Arc<ManualTimers>, Arc<RecordingSink>>;

struct Harness {
    engine: Engine,
    sink: Arc<RecordingSink>,
    timers: Arc<ManualTimers>,
}

impl Harness {
    fn new(sources: &[Key]) -> Self {
        let table = KeyTable::new(sources, ESC).unwrap();
        let sink = Arc::new(RecordingSink::new());
        let timers = Arc::new(ManualTimers::new(table.down_templates(), sink.clone()));
        let engine = ChordEngine::new(table, timers.clone(), sink.clone());
        Self {
            engine,
            sink,
            timers,
        }
    }

    fn press(&mut self, key: Key) {
        self.engine.process(RawInputEvent::key(key, Action::Press)).unwrap();
    }

    fn release(&mut self, key: Key) {
        self.engine.process(RawInputEvent::key(key, Action::Release)).unwrap();
    }

    fn repeat(&mut self, key: Key) {
        self.engine.process(RawInputEvent::key(key, Action::Repeat)).unwrap();
    }

    fn expire(&self, key: Key) -> bool {
        self.timers.expire(key).unwrap()
    }

    /// Emitted key records as (key, action) pairs, after checking that every
    /// key record is immediately followed by a SYN_REPORT.
    fn take_keys(&self) -> Vec<(Key, Action)> {
        let events = self.sink.take();
        assert_eq!(events.len() % 2, 0, "unpaired frame in {:?}", events);
        events
            .chunks(2)
            .map(|frame| {
                assert!(frame[0].is_key_event(), "expected key record, got {:?}", frame[0]);
                assert_eq!(frame[1], RawInputEvent::syn_report());
                (frame[0].key_code(), frame[0].action().unwrap())
            })
            .collect()
    }

    /// Key frames since the last take, with the settle flag each one carried
    fn take_settles(&self) -> Vec<(Key, Action, bool)> {
        let frames = self.sink.key_frames();
        self.sink.take();
        frames
            .into_iter()
            .map(|(e, settle)| (e.key_code(), e.action().unwrap(), settle))
            .collect()
    }

    fn armed(&self, key: Key) -> bool {
        match self.engine.table().lookup(key.code()) {
            simulrs_core::SlotLookup::Found(slot) => self.timers.is_armed(slot),
            simulrs_core::SlotLookup::NotFound => panic!("{} is not a source key", key),
        }
    }
}

// =========================================================================
// Single tap
// =========================================================================

#[test]
fn single_tap_within_threshold_restores_original_key() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    assert!(h.take_keys().is_empty());
    h.release(J);

    assert_eq!(h.take_keys(), vec![(J, Action::Press), (J, Action::Release)]);
    assert!(h.engine.is_idle());
}

#[test]
fn tap_release_keeps_original_record_timestamp() {
    let mut h = Harness::new(&[J, K]);
    h.press(J);

    let mut up = RawInputEvent::key(J, Action::Release);
    up.time_sec = 42;
    up.time_usec = 7;
    h.engine.process(up).unwrap();

    let events = h.sink.take();
    assert_eq!(events[2], up);
}

// =========================================================================
// Clean chord and order independence
// =========================================================================

#[test]
fn clean_chord_emits_one_target_press_and_release() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.press(K);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Press)]);
    assert_eq!(h.engine.target_state(), TargetState::PressWritten);

    h.release(J);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Release)]);
    assert_eq!(h.engine.target_state(), TargetState::ReleaseWritten);

    h.release(K);
    assert!(h.take_keys().is_empty());
    assert_eq!(h.engine.target_state(), TargetState::Init);
}

#[test]
fn chord_output_does_not_depend_on_release_order() {
    let run = |first: Key, second: Key| {
        let mut h = Harness::new(&[J, K]);
        h.press(J);
        h.press(K);
        h.release(first);
        h.release(second);
        (h.take_keys(), h.engine.is_idle())
    };

    let expected = vec![(ESC, Action::Press), (ESC, Action::Release)];
    assert_eq!(run(J, K), (expected.clone(), true));
    assert_eq!(run(K, J), (expected, true));
}

#[test]
fn chord_does_not_depend_on_press_order() {
    let mut h = Harness::new(&[J, K]);
    h.press(K);
    h.press(J);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Press)]);
}

#[test]
fn chord_members_never_fire_late() {
    let mut h = Harness::new(&[J, K]);
    h.press(J);
    h.press(K);
    h.take_keys();

    assert!(!h.expire(J));
    assert!(!h.expire(K));
    assert!(h.take_keys().is_empty());
}

#[test]
fn repeats_during_chord_are_dropped() {
    let mut h = Harness::new(&[J, K]);
    h.press(J);
    h.press(K);
    h.repeat(J);
    h.repeat(K);
    h.release(K);
    h.repeat(J);
    h.release(J);

    assert_eq!(
        h.take_keys(),
        vec![(ESC, Action::Press), (ESC, Action::Release)]
    );
}

// =========================================================================
// Interrupted chord
// =========================================================================

#[test]
fn unrelated_press_flushes_pending_source_first() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.press(X);
    assert_eq!(h.take_keys(), vec![(J, Action::Press), (X, Action::Press)]);
    assert!(!h.armed(J));

    // K is judged on its own: J is no longer pending, so no chord.
    h.press(K);
    assert!(h.take_keys().is_empty());
    assert!(h.armed(K));
    h.release(K);
    assert_eq!(h.take_keys(), vec![(K, Action::Press), (K, Action::Release)]);
    assert_eq!(h.engine.target_state(), TargetState::Init);
}

#[test]
fn unrelated_release_and_repeat_do_not_flush() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.repeat(A);
    h.release(X);
    assert_eq!(h.take_keys(), vec![(A, Action::Repeat), (X, Action::Release)]);
    assert!(h.armed(J));

    h.press(K);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Press)]);
}

#[test]
fn non_key_records_pass_through_untouched() {
    let mut h = Harness::new(&[J, K]);
    h.press(J);

    let msc = RawInputEvent {
        time_sec: 1,
        time_usec: 2,
        event_type: 0x04,
        code: 0x04,
        value: 0x70024,
    };
    let syn = RawInputEvent {
        time_sec: 1,
        time_usec: 2,
        event_type: EV_SYN,
        code: 0,
        value: 0,
    };
    h.engine.process(msc).unwrap();
    h.engine.process(syn).unwrap();

    assert_eq!(h.sink.take(), vec![msc, syn]);
    assert!(h.armed(J));
}

#[test]
fn key_record_with_unknown_value_is_forwarded_raw() {
    let mut h = Harness::new(&[J, K]);
    h.press(J);

    let mut odd = RawInputEvent::key(K, Action::Press);
    odd.value = 9;
    h.engine.process(odd).unwrap();

    assert_eq!(h.sink.take(), vec![odd]);
    assert!(h.armed(J));
    assert!(!h.armed(K));
}

// =========================================================================
// Threshold expiry
// =========================================================================

#[test]
fn held_source_is_emitted_once_threshold_elapses() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    assert!(h.expire(J));
    assert_eq!(h.take_keys(), vec![(J, Action::Press)]);

    h.repeat(J);
    h.release(J);
    assert_eq!(h.take_keys(), vec![(J, Action::Repeat), (J, Action::Release)]);
    assert!(h.engine.is_idle());
}

#[test]
fn press_after_partner_expired_is_not_a_chord() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.expire(J);
    h.press(K);
    assert_eq!(h.take_keys(), vec![(J, Action::Press)]);
    assert!(h.armed(K));

    h.release(J);
    h.release(K);
    assert_eq!(
        h.take_keys(),
        vec![(J, Action::Release), (K, Action::Press), (K, Action::Release)]
    );
}

#[test]
fn repress_restarts_the_window() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.expire(J);
    h.release(J);
    h.take_keys();

    h.press(J);
    assert!(h.armed(J));
    h.press(K);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Press)]);
}

// =========================================================================
// Idempotent reset
// =========================================================================

#[test]
fn identical_chord_is_recognized_again_after_reset() {
    let mut h = Harness::new(&[J, K]);

    for _ in 0..3 {
        h.press(J);
        h.press(K);
        h.release(K);
        h.release(J);
        assert_eq!(
            h.take_keys(),
            vec![(ESC, Action::Press), (ESC, Action::Release)]
        );
        assert!(h.engine.is_idle());
        assert_eq!(h.timers.armed_count(), 0);
    }
}

#[test]
fn repressing_a_released_member_does_not_start_a_second_chord() {
    let mut h = Harness::new(&[J, K]);

    h.press(J);
    h.press(K);
    h.release(J);
    h.take_keys();

    // K is still held from the chord; J comes back on its own.
    h.press(J);
    assert!(h.take_keys().is_empty());
    assert!(h.armed(J));

    h.release(K);
    assert!(h.take_keys().is_empty());
    assert_eq!(h.engine.target_state(), TargetState::Init);

    h.release(J);
    assert_eq!(h.take_keys(), vec![(J, Action::Press), (J, Action::Release)]);
    assert!(h.engine.is_idle());
}

// =========================================================================
// Three source keys
// =========================================================================

#[test]
fn three_key_chord_needs_all_three() {
    let mut h = Harness::new(&[J, K, L]);

    h.press(J);
    h.press(K);
    assert!(h.take_keys().is_empty());
    assert!(h.armed(J) && h.armed(K));

    h.press(L);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Press)]);
    assert_eq!(h.timers.armed_count(), 0);
}

#[test]
fn three_key_chord_returns_to_init_on_last_release() {
    let mut h = Harness::new(&[J, K, L]);
    h.press(L);
    h.press(J);
    h.press(K);
    h.take_keys();

    h.release(J);
    assert_eq!(h.take_keys(), vec![(ESC, Action::Release)]);
    h.release(L);
    assert!(h.take_keys().is_empty());
    assert_eq!(h.engine.target_state(), TargetState::ReleaseWritten);
    h.release(K);
    assert!(h.take_keys().is_empty());
    assert_eq!(h.engine.target_state(), TargetState::Init);
    assert!(h.engine.is_idle());
}

#[test]
fn partial_three_key_overlap_degrades_to_single_keys() {
    let mut h = Harness::new(&[J, K, L]);

    h.press(J);
    h.press(K);
    h.expire(J);
    assert_eq!(h.take_keys(), vec![(J, Action::Press)]);

    // J already fired, so L cannot complete the chord.
    h.press(L);
    assert!(h.take_keys().is_empty());
    h.release(K);
    h.release(L);
    h.release(J);
    assert_eq!(
        h.take_keys(),
        vec![
            (K, Action::Press),
            (K, Action::Release),
            (L, Action::Press),
            (L, Action::Release),
            (J, Action::Release),
        ]
    );
}

#[test]
fn interruption_flushes_pending_sources_oldest_first() {
    let mut h = Harness::new(&[J, K, L]);

    h.press(L);
    h.press(J);
    h.press(A);
    assert_eq!(
        h.take_keys(),
        vec![(L, Action::Press), (J, Action::Press), (A, Action::Press)]
    );

    // A slot re-armed later moves behind the others.
    h.press(J);
    h.press(K);
    h.expire(J);
    h.take_keys();
    h.press(L);
    h.press(X);
    assert_eq!(
        h.take_keys(),
        vec![(K, Action::Press), (L, Action::Press), (X, Action::Press)]
    );
}

#[test]
fn press_extending_a_pending_window_keeps_its_flush_position() {
    let mut h = Harness::new(&[J, K, L]);

    h.press(J);
    h.press(L);
    // Second press with no release in between only restarts J's window.
    h.press(J);
    assert!(h.armed(J) && h.armed(L));

    h.press(A);
    assert_eq!(
        h.take_keys(),
        vec![(J, Action::Press), (L, Action::Press), (A, Action::Press)]
    );
}

// =========================================================================
// Settle delay
// =========================================================================

#[test]
fn only_deferred_presses_ask_for_settle() {
    let mut h = Harness::new(&[J, K]);

    // Interruption flush
    h.press(J);
    h.press(A);
    assert_eq!(
        h.take_settles(),
        vec![(J, Action::Press, true), (A, Action::Press, false)]
    );

    // Tap flush
    h.press(J);
    h.release(J);
    assert_eq!(
        h.take_settles(),
        vec![(J, Action::Press, true), (J, Action::Release, false)]
    );

    // Chord target down and up
    h.press(J);
    h.press(K);
    h.release(K);
    h.release(J);
    assert_eq!(
        h.take_settles(),
        vec![(ESC, Action::Press, false), (ESC, Action::Release, false)]
    );

    // Threshold expiry, then pass-through of the release and unrelated keys
    h.press(K);
    h.expire(K);
    h.release(K);
    h.release(A);
    assert_eq!(
        h.take_settles(),
        vec![
            (K, Action::Press, true),
            (K, Action::Release, false),
            (A, Action::Release, false),
        ]
    );
}
