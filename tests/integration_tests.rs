// Integration tests for the swipe-match engine

mod common;

use std::sync::Arc;
use std::time::Duration;
use common::{harness, harness_with, scored, unavailable, ScriptedScorer, StaticProfiles};
use swipe_match::core::SwipeError;
use swipe_match::models::{Caller, ScoreState, SwipeDirection};
use swipe_match::services::SwipeStore;

#[tokio::test]
async fn test_interested_swipe_with_high_score_matches() {
    let h = harness(ScriptedScorer::always(scored(85.0, true)));
    let s1 = Caller::student("S1");

    let result = h
        .engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    assert!(result.is_match);
    assert!(!result.deferred);
    let match_id = result.match_id.expect("match id");

    let matches = h.engine.query.list_matches("S1").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, match_id);
    assert_eq!(matches[0].listing_id, "L1");
    assert_eq!(matches[0].faculty_id, "F1");
    assert_eq!(matches[0].swipe_id, result.swipe_id);

    let swipe = h.engine.query.get_swipe_status("S1", "L1").await.unwrap();
    assert_eq!(swipe.score_state, ScoreState::Scored { score: 85.0, matched: true });
}

#[tokio::test]
async fn test_repeated_swipe_is_rejected() {
    let h = harness(ScriptedScorer::always(scored(85.0, true)));
    let s1 = Caller::student("S1");

    h.engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    let err = h
        .engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Interested)
        .await
        .unwrap_err();

    assert!(matches!(err, SwipeError::AlreadySwiped { .. }));
    assert_eq!(h.store.swipe_count().await, 1);
    assert_eq!(h.engine.query.list_matches("S1").await.unwrap().len(), 1);
    assert_eq!(h.scorer.calls(), 1);
}

#[tokio::test]
async fn test_opposite_direction_after_swipe_is_rejected() {
    let h = harness(ScriptedScorer::always(scored(10.0, false)));
    let s1 = Caller::student("S1");

    h.engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Passed)
        .await
        .unwrap();

    let err = h
        .engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Interested)
        .await
        .unwrap_err();

    assert!(matches!(err, SwipeError::AlreadySwiped { .. }));
    let swipe = h.engine.query.get_swipe_status("S1", "L1").await.unwrap();
    assert_eq!(swipe.direction, SwipeDirection::Passed);
}

#[tokio::test]
async fn test_passed_swipe_never_scores() {
    let h = harness(ScriptedScorer::always(scored(99.0, true)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S2"), "L1", SwipeDirection::Passed)
        .await
        .unwrap();

    assert!(!result.is_match);
    assert!(!result.deferred);
    assert_eq!(result.match_id, None);
    assert_eq!(h.scorer.calls(), 0);
    assert_eq!(h.store.match_count().await, 0);

    let swipe = h.engine.query.get_swipe_status("S2", "L1").await.unwrap();
    assert_eq!(swipe.score_state, ScoreState::NotApplicable);
}

#[tokio::test]
async fn test_scorer_timeout_defers_then_retry_resolves_without_match() {
    let h = harness(ScriptedScorer::sequence(
        vec![unavailable()],
        scored(40.0, false),
    ));
    let s3 = Caller::student("S3");

    let result = h
        .engine
        .recorder
        .record_swipe(&s3, "L2", SwipeDirection::Interested)
        .await
        .unwrap();

    assert!(!result.is_match);
    assert!(result.deferred);
    let swipe = h.engine.query.get_swipe_status("S3", "L2").await.unwrap();
    assert_eq!(swipe.score_state, ScoreState::Pending);

    let decision = h
        .engine
        .resolver
        .resolve_match("S3", "L2", result.swipe_id)
        .await
        .unwrap();

    assert!(!decision.is_match);
    assert!(!decision.deferred);
    assert_eq!(decision.score, Some(40.0));

    let swipe = h.engine.query.get_swipe_status("S3", "L2").await.unwrap();
    assert_eq!(swipe.score_state, ScoreState::Scored { score: 40.0, matched: false });
    assert!(h.engine.query.list_matches("S3").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendation_overrides_low_score() {
    let h = harness(ScriptedScorer::always(scored(12.0, true)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    assert!(result.is_match);
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let h = harness(ScriptedScorer::sequence(
        vec![scored(70.0, false)],
        scored(69.9, false),
    ));

    let at = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();
    let below = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L2", SwipeDirection::Interested)
        .await
        .unwrap();

    assert!(at.is_match);
    assert!(!below.is_match);
}

#[tokio::test]
async fn test_re_resolving_scored_swipe_is_noop() {
    let h = harness(ScriptedScorer::sequence(
        vec![scored(90.0, false)],
        scored(5.0, false),
    ));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    for _ in 0..3 {
        let decision = h
            .engine
            .resolver
            .resolve_match("S1", "L1", result.swipe_id)
            .await
            .unwrap();
        assert!(decision.is_match);
        assert_eq!(decision.match_id, result.match_id);
        assert_eq!(decision.score, Some(90.0));
    }

    assert_eq!(h.scorer.calls(), 1);
    assert_eq!(h.store.match_count().await, 1);
}

#[tokio::test]
async fn test_resolve_rejects_foreign_swipe() {
    let h = harness(ScriptedScorer::always(unavailable()));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    let err = h
        .engine
        .resolver
        .resolve_match("S2", "L1", result.swipe_id)
        .await
        .unwrap_err();

    assert!(matches!(err, SwipeError::SwipeNotFound(id) if id == result.swipe_id));
}

#[tokio::test]
async fn test_resolve_passed_swipe_is_not_applicable() {
    let h = harness(ScriptedScorer::always(scored(99.0, true)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Passed)
        .await
        .unwrap();

    let decision = h
        .engine
        .resolver
        .resolve_match("S1", "L1", result.swipe_id)
        .await
        .unwrap();

    assert!(!decision.is_match);
    assert!(!decision.deferred);
    assert_eq!(decision.score, None);
    assert_eq!(h.scorer.calls(), 0);
}

#[tokio::test]
async fn test_faculty_cannot_swipe() {
    let h = harness(ScriptedScorer::always(scored(99.0, true)));

    let err = h
        .engine
        .recorder
        .record_swipe(&Caller::faculty("F1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap_err();

    assert!(matches!(err, SwipeError::Unauthorized(_)));
    assert_eq!(h.store.swipe_count().await, 0);
}

#[tokio::test]
async fn test_unknown_and_inactive_listings_fail_before_write() {
    let h = harness(ScriptedScorer::always(scored(99.0, true)));
    let s1 = Caller::student("S1");

    let err = h
        .engine
        .recorder
        .record_swipe(&s1, "L-missing", SwipeDirection::Interested)
        .await
        .unwrap_err();
    assert!(matches!(err, SwipeError::ListingNotFound(_)));

    let err = h
        .engine
        .recorder
        .record_swipe(&s1, "L-closed", SwipeDirection::Passed)
        .await
        .unwrap_err();
    assert!(matches!(err, SwipeError::ListingInactive(_)));

    assert_eq!(h.store.swipe_count().await, 0);
}

#[tokio::test]
async fn test_profile_failure_leaves_swipe_pending() {
    let h = harness_with(
        ScriptedScorer::always(scored(99.0, true)),
        StaticProfiles::without(&["S9"]),
    );

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S9"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    assert!(result.deferred);
    assert_eq!(h.scorer.calls(), 0);
    let swipe = h.engine.query.get_swipe_status("S9", "L1").await.unwrap();
    assert!(swipe.score_state.is_pending());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_swipes_record_once() {
    let h = harness(
        ScriptedScorer::always(scored(80.0, false)).with_delay(Duration::from_millis(5)),
    );
    let recorder = Arc::new(h.engine.recorder.clone());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let recorder = recorder.clone();
            tokio::spawn(async move {
                recorder
                    .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(SwipeError::AlreadySwiped { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(rejected, 15);
    assert_eq!(h.store.swipe_count().await, 1);
    assert_eq!(h.store.match_count().await, 1);
    assert_eq!(h.scorer.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_creates_one_match() {
    let h = harness(ScriptedScorer::sequence(
        vec![unavailable()],
        scored(95.0, true),
    ).with_delay(Duration::from_millis(5)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();
    assert!(result.deferred);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let resolver = h.engine.resolver.clone();
            let swipe_id = result.swipe_id;
            tokio::spawn(async move { resolver.resolve_match("S1", "L1", swipe_id).await })
        })
        .collect();

    let mut match_ids = Vec::new();
    for task in tasks {
        let decision = task.await.unwrap().unwrap();
        assert!(decision.is_match);
        match_ids.push(decision.match_id);
    }

    match_ids.dedup();
    assert_eq!(match_ids.len(), 1);
    assert_eq!(h.store.match_count().await, 1);
}

#[tokio::test]
async fn test_list_matches_newest_first_and_read_only() {
    let h = harness(ScriptedScorer::always(scored(90.0, false)));
    let s1 = Caller::student("S1");

    for listing in ["L1", "L2", "L3"] {
        h.engine
            .recorder
            .record_swipe(&s1, listing, SwipeDirection::Interested)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    h.engine
        .recorder
        .record_swipe(&Caller::student("S2"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();

    let first = h.engine.query.list_matches("S1").await.unwrap();
    let listings: Vec<&str> = first.iter().map(|m| m.listing_id.as_str()).collect();
    assert_eq!(listings, vec!["L3", "L2", "L1"]);
    assert!(first.iter().all(|m| m.student_id == "S1"));

    let second = h.engine.query.list_matches("S1").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_swipe_history_and_missing_status() {
    let h = harness(ScriptedScorer::always(scored(20.0, false)));
    let s1 = Caller::student("S1");

    h.engine
        .recorder
        .record_swipe(&s1, "L1", SwipeDirection::Passed)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    h.engine
        .recorder
        .record_swipe(&s1, "L2", SwipeDirection::Interested)
        .await
        .unwrap();

    let history = h.engine.query.list_swipes("S1").await.unwrap();
    let listings: Vec<&str> = history.iter().map(|s| s.listing_id.as_str()).collect();
    assert_eq!(listings, vec!["L2", "L1"]);

    let err = h.engine.query.get_swipe_status("S1", "L3").await.unwrap_err();
    assert!(matches!(err, SwipeError::SwipeStatusNotFound(_)));
}

#[tokio::test]
async fn test_faculty_matches_cover_own_listings_only() {
    let h = harness(ScriptedScorer::always(scored(90.0, true)));

    for (student, listing) in [("S1", "L1"), ("S2", "L2"), ("S3", "L3")] {
        h.engine
            .recorder
            .record_swipe(&Caller::student(student), listing, SwipeDirection::Interested)
            .await
            .unwrap();
    }

    let matches = h
        .engine
        .query
        .list_faculty_matches(&Caller::faculty("F1"))
        .await
        .unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.faculty_id == "F1"));

    let err = h
        .engine
        .query
        .list_faculty_matches(&Caller::student("S1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SwipeError::Unauthorized(_)));
}

#[tokio::test]
async fn test_reconcile_resolves_pending_swipes() {
    let h = harness(ScriptedScorer::sequence(
        vec![unavailable(), unavailable(), unavailable()],
        scored(10.0, false),
    ));

    for (student, listing) in [("S1", "L1"), ("S2", "L1"), ("S3", "L2")] {
        let result = h
            .engine
            .recorder
            .record_swipe(&Caller::student(student), listing, SwipeDirection::Interested)
            .await
            .unwrap();
        assert!(result.deferred);
    }
    assert_eq!(h.store.list_pending(10).await.unwrap().len(), 3);

    let report = h.engine.resolver.reconcile_pending(2).await.unwrap();
    assert_eq!(report.examined, 2);
    assert_eq!(report.scored_no_match, 2);
    assert_eq!(h.store.list_pending(10).await.unwrap().len(), 1);

    let report = h.engine.resolver.reconcile_pending(10).await.unwrap();
    assert_eq!(report.examined, 1);
    assert_eq!(h.store.list_pending(10).await.unwrap().len(), 0);

    let report = h.engine.resolver.reconcile_pending(10).await.unwrap();
    assert_eq!(report.examined, 0);
}

#[tokio::test]
async fn test_reconcile_rotates_past_failing_swipes() {
    // S-bad has no profile, so its swipes fail on every attempt
    let h = harness_with(
        ScriptedScorer::sequence(vec![unavailable()], scored(85.0, false)),
        StaticProfiles::without(&["S-bad"]),
    );
    let bad = Caller::student("S-bad");

    for listing in ["L1", "L2"] {
        let result = h
            .engine
            .recorder
            .record_swipe(&bad, listing, SwipeDirection::Interested)
            .await
            .unwrap();
        assert!(result.deferred);
    }

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S-ok"), "L3", SwipeDirection::Interested)
        .await
        .unwrap();
    assert!(result.deferred);

    let first = h.engine.resolver.reconcile_pending(2).await.unwrap();
    assert_eq!(first.examined, 2);
    assert_eq!(first.failed, 2);

    let second = h.engine.resolver.reconcile_pending(2).await.unwrap();
    assert_eq!(second.matched, 1);

    let swipe = h.store.find_swipe("S-ok", "L3").await.unwrap().unwrap();
    assert_eq!(swipe.score_state, ScoreState::Scored { score: 85.0, matched: true });

    // The failing swipes are still retried on later sweeps
    let third = h.engine.resolver.reconcile_pending(2).await.unwrap();
    assert_eq!(third.examined, 2);
    assert_eq!(third.failed, 2);
    assert_eq!(h.store.list_pending(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_out_of_range_score_is_clamped_before_storing() {
    let h = harness(ScriptedScorer::always(scored(150.0, false)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();
    assert!(result.is_match);

    let swipe = h.store.find_swipe("S1", "L1").await.unwrap().unwrap();
    assert_eq!(swipe.score_state, ScoreState::Scored { score: 100.0, matched: true });
}

#[tokio::test]
async fn test_non_finite_score_leaves_swipe_pending() {
    let h = harness(ScriptedScorer::always(scored(f64::NAN, true)));

    let result = h
        .engine
        .recorder
        .record_swipe(&Caller::student("S1"), "L1", SwipeDirection::Interested)
        .await
        .unwrap();
    assert!(result.deferred);
    assert!(!result.is_match);

    let swipe = h.store.find_swipe("S1", "L1").await.unwrap().unwrap();
    assert_eq!(swipe.score_state, ScoreState::Pending);
    assert_eq!(h.store.match_count().await, 0);
}
