use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arena::event::{
    Accolade, DominationProcessor, Event, EventKind, EventLog, LossReason, Pacing,
};
use arena::{Coordinates, PlayerId, Shot};

const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);

fn begin() -> Event {
    Event::new(1, EventKind::RoundBegin { turn_order: vec![A, B] }, None)
}

fn hit(shooter: PlayerId, receiver: PlayerId, x: i32) -> Event {
    let shot = Shot::new(Coordinates::new(x, 0), receiver);
    Event::new(1, EventKind::ShotHit { shot }, Some(shooter))
}

fn miss(shooter: PlayerId, receiver: PlayerId, elapsed_ms: u64) -> Event {
    let shot = Shot::new(Coordinates::new(9, 9), receiver);
    Event::new(1, EventKind::ShotMiss { shot }, Some(shooter))
        .with_elapsed(Duration::from_millis(elapsed_ms))
}

fn sinking(shooter: PlayerId, receiver: PlayerId) -> Event {
    let shot = Shot::new(Coordinates::new(0, 0), receiver);
    Event::new(1, EventKind::ShipDestroyed { shot, length: 2 }, Some(shooter))
}

fn won(player: PlayerId) -> Event {
    Event::new(1, EventKind::PlayerWon, Some(player))
}

#[test]
fn get_returns_the_same_event_every_time() {
    let mut log = EventLog::new();
    let idx = log.append(begin());
    log.append(hit(A, B, 0));

    let first = log.get(idx).unwrap();
    let second = log.get(idx).unwrap();
    assert!(Arc::ptr_eq(first, second));
    assert_eq!(first.kind, EventKind::RoundBegin { turn_order: vec![A, B] });
    assert!(log.get(2).is_none());
    assert_eq!(log.len(), 2);
}

#[test]
fn domination_needs_an_untouched_fleet() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    log.append(sinking(A, B));
    let idx = log.append(won(A));
    assert!(log.get(idx).unwrap().has_accolade(Accolade::Domination));

    log.append(begin());
    log.append(sinking(B, A));
    let idx = log.append(won(A));
    assert!(!log.get(idx).unwrap().has_accolade(Accolade::Domination));
}

#[test]
fn comeback_after_trailing_by_two() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    log.append(sinking(B, A));
    log.append(sinking(B, A));
    for _ in 0..3 {
        log.append(sinking(A, B));
    }
    let idx = log.append(won(A));
    let event = log.get(idx).unwrap();
    assert!(event.has_accolade(Accolade::Comeback));
    assert!(!event.has_accolade(Accolade::Domination));
}

#[test]
fn fifth_hit_in_a_row_is_a_hot_streak() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    let hits: Vec<usize> = (0..6).map(|x| log.append(hit(A, B, x))).collect();
    let tagged: Vec<bool> = hits
        .iter()
        .map(|&i| log.get(i).unwrap().has_accolade(Accolade::HotStreak))
        .collect();
    assert_eq!(tagged, vec![false, false, false, false, true, false]);

    // a miss resets the streak
    log.append(miss(A, B, 0));
    let idx = (0..5).map(|x| log.append(hit(A, B, x))).last().unwrap();
    assert!(log.get(idx).unwrap().has_accolade(Accolade::HotStreak));
}

#[test]
fn pace_outliers_are_tagged() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    for _ in 0..5 {
        let idx = log.append(miss(A, B, 10));
        assert!(log.get(idx).unwrap().accolades.is_empty());
    }
    let slow = log.append(miss(A, B, 100));
    assert!(log.get(slow).unwrap().has_accolade(Accolade::Slow));
    let fast = log.append(miss(A, B, 1));
    assert!(log.get(fast).unwrap().has_accolade(Accolade::Fast));
    // another player's history is separate
    let other = log.append(miss(B, A, 500));
    assert!(log.get(other).unwrap().accolades.is_empty());
}

#[test]
fn trading_sinkings_is_head_to_head() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    let first = log.append(sinking(A, B));
    let answer = log.append(sinking(B, A));
    let again = log.append(sinking(B, A));
    assert!(!log.get(first).unwrap().has_accolade(Accolade::HeadToHead));
    assert!(log.get(answer).unwrap().has_accolade(Accolade::HeadToHead));
    assert!(!log.get(again).unwrap().has_accolade(Accolade::HeadToHead));
}

#[test]
fn custom_processor_list() {
    let mut log = EventLog::new();
    log.add_processor(Box::new(DominationProcessor::default()));
    log.append(begin());
    for x in 0..5 {
        log.append(hit(A, B, x));
    }
    let idx = log.append(won(A));
    assert!(log.iter().take(idx).all(|e| e.accolades.is_empty()));
    assert_eq!(log.get(idx).unwrap().accolades, vec![Accolade::Domination]);
}

#[test]
fn listeners_see_every_event_after_tagging() {
    let mut log = EventLog::with_accolades();
    let seen = Arc::new(AtomicUsize::new(0));
    let tagged = Arc::new(AtomicUsize::new(0));
    {
        let seen = Arc::clone(&seen);
        let tagged = Arc::clone(&tagged);
        log.add_listener(move |event: &Event| {
            seen.fetch_add(1, Ordering::SeqCst);
            if !event.accolades.is_empty() {
                tagged.fetch_add(1, Ordering::SeqCst);
            }
        });
    }
    let mut rx = log.subscribe();

    log.append(begin());
    log.append(won(A));

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(tagged.load(Ordering::SeqCst), 1);
    let received = rx.try_recv().unwrap();
    assert!(Arc::ptr_eq(&received, log.get(0).unwrap()));
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());

    drop(rx);
    log.append(begin());
    assert_eq!(log.len(), 3);
}

#[test]
fn round_filter_and_replay_cursor() {
    let mut log = EventLog::new();
    log.append(Event::new(0, EventKind::MatchBegin { players: vec!["a".into(), "b".into()] }, None));
    log.append(begin());
    log.append(hit(A, B, 0));
    log.append(Event::new(2, EventKind::RoundBegin { turn_order: vec![B, A] }, None));

    assert_eq!(log.round(1).count(), 2);
    assert_eq!(log.round(2).count(), 1);

    let mut replay = log.replay();
    assert_eq!(replay.by_ref().count(), 4);
    assert!(replay.at_end());
    replay.seek(2);
    assert_eq!(replay.next().unwrap().kind.name(), "shot-hit");
    replay.seek(100);
    assert_eq!(replay.position(), 4);
    replay.rewind();
    assert_eq!(replay.position(), 0);
    assert_eq!(replay.next().unwrap().round, 0);
}

#[tokio::test]
async fn paced_replay_waits_for_recorded_time() {
    let mut log = EventLog::new();
    log.append(begin());
    log.append(miss(A, B, 80));

    let mut replay = log.replay();
    let started = tokio::time::Instant::now();
    replay.play(Pacing::Immediate).await.unwrap();
    replay.play(Pacing::Recorded { speed: 2.0 }).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert!(replay.play(Pacing::Immediate).await.is_none());
}

#[tokio::test]
async fn tiny_replay_speed_skips_the_pause() {
    let mut log = EventLog::new();
    log.append(miss(A, B, 5));

    let mut replay = log.replay();
    let played = tokio::time::timeout(
        Duration::from_secs(1),
        replay.play(Pacing::Recorded { speed: 1e-300 }),
    )
    .await
    .expect("pause should be skipped");
    assert!(played.is_some());
    assert!(replay.at_end());
}

#[test]
fn log_survives_a_bincode_round_trip() {
    let mut log = EventLog::with_accolades();
    log.append(begin());
    log.append(hit(A, B, 3).with_detail("a hit b at (3, 0)"));
    log.append(
        Event::new(
            1,
            EventKind::PlayerLost {
                reason: LossReason::Defeated,
            },
            Some(B),
        )
        .with_elapsed(Duration::from_millis(12)),
    );
    log.append(won(A));

    let mut bytes = Vec::new();
    log.write_to(&mut bytes).unwrap();
    let loaded = EventLog::read_from(bytes.as_slice()).unwrap();

    assert_eq!(loaded.len(), log.len());
    for (a, b) in log.iter().zip(loaded.iter()) {
        assert_eq!(a.as_ref(), b.as_ref());
    }
    assert!(loaded.last().unwrap().has_accolade(Accolade::Domination));
}

#[test]
fn truncated_log_is_an_error() {
    let mut log = EventLog::new();
    log.append(begin());
    let mut bytes = Vec::new();
    log.write_to(&mut bytes).unwrap();
    bytes.truncate(bytes.len() / 2);
    assert!(EventLog::read_from(bytes.as_slice()).is_err());
}
