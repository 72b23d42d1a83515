mod common;

use std::sync::Arc;

use common::{mixed_board, posting, DetailPages, StaticBoard};
use entry_scout::workflows::discovery::{find_new, DiscoveryCursor};
use entry_scout::workflows::pipeline::{
    JobStore, PipelineError, PipelineOrchestrator, PipelineSettings, RunIssue, RunMode,
};
use entry_scout::workflows::postings::JobKey;
use entry_scout::workflows::screening::Strictness;
use entry_scout::workflows::storage::{JsonFileJobStore, MemoryJobStore};

#[test]
fn strict_run_over_two_pages_matches_only_entry_level_postings() {
    let (listings, details) = mixed_board("meta");
    let board = Arc::new(StaticBoard::new("meta", listings, 20));
    let store = Arc::new(MemoryJobStore::new());

    let summary = PipelineOrchestrator::new(
        board.clone(),
        Arc::new(details),
        store.clone(),
        PipelineSettings::default(),
    )
    .run(RunMode::Full)
    .expect("run completes");

    assert_eq!(board.requested_pages(), vec![1, 2]);
    assert_eq!(summary.processed_count, 25);
    assert_eq!(summary.matched_count, 22);
    assert!(!summary.matched.contains(&JobKey::new("0003", "meta")));
    assert!(!summary.matched.contains(&JobKey::new("0007", "meta")));
    assert!(!summary.matched.contains(&JobKey::new("0015", "meta")));
    assert!(summary.matched.contains(&JobKey::new("0010", "meta")));
    assert_eq!(store.len(), 25);
}

#[test]
fn lenient_run_lets_research_roles_through() {
    let (listings, details) = mixed_board("meta");
    let settings = PipelineSettings {
        strictness: Strictness::Lenient,
        ..PipelineSettings::default()
    };

    let summary = PipelineOrchestrator::new(
        Arc::new(StaticBoard::new("meta", listings, 20)),
        Arc::new(details),
        Arc::new(MemoryJobStore::new()),
        settings,
    )
    .run(RunMode::Full)
    .expect("run completes");

    assert_eq!(summary.matched_count, 23);
    assert!(summary.matched.contains(&JobKey::new("0007", "meta")));
}

#[test]
fn repeated_full_runs_do_not_duplicate_stored_postings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonFileJobStore::open(dir.path().join("jobs.json")).expect("store"));
    let settings = PipelineSettings {
        force_refresh: true,
        ..PipelineSettings::default()
    };

    for _ in 0..2 {
        let (listings, details) = mixed_board("apple");
        PipelineOrchestrator::new(
            Arc::new(StaticBoard::new("apple", listings, 20)),
            Arc::new(details),
            store.clone(),
            settings,
        )
        .run(RunMode::Full)
        .expect("run completes");
    }

    let stored = store.postings(Some("apple"), None).expect("postings");
    assert_eq!(stored.len(), 25);
    assert_eq!(stored.iter().filter(|posting| posting.entry_level).count(), 22);
}

#[test]
fn incremental_run_only_details_postings_ahead_of_the_cursor() {
    let (listings, details) = mixed_board("nvidia");
    let fresh_ids: Vec<String> = listings.iter().filter_map(|l| l.id.clone()).collect();
    let cursor = DiscoveryCursor::new(vec!["0004".to_string(), "0005".to_string()]);
    assert_eq!(find_new(&fresh_ids, &cursor), vec!["0001", "0002", "0003"]);

    let board = Arc::new(StaticBoard::new("nvidia", listings, 20));
    let summary = PipelineOrchestrator::new(
        board.clone(),
        Arc::new(details),
        Arc::new(MemoryJobStore::new()),
        PipelineSettings::default(),
    )
    .run(RunMode::IncrementalNew(cursor))
    .expect("run completes");

    assert_eq!(board.requested_pages(), vec![1]);
    assert_eq!(summary.processed_count, 3);
    assert_eq!(summary.matched_count, 2);
    assert_eq!(
        summary.next_cursor.recent_ids(),
        ["0001".to_string(), "0002".to_string(), "0003".to_string()]
    );
}

#[test]
fn unreachable_first_page_is_the_only_abort() {
    let (listings, details) = mixed_board("amazon");
    let result = PipelineOrchestrator::new(
        Arc::new(StaticBoard::new("amazon", listings, 20).with_page_down(1)),
        Arc::new(details),
        Arc::new(MemoryJobStore::new()),
        PipelineSettings::default(),
    )
    .run(RunMode::Full);

    assert!(matches!(
        result,
        Err(PipelineError::SourceUnavailable { ref company, .. }) if company == "amazon"
    ));
}

#[test]
fn partial_failures_still_produce_a_summary() {
    let (listings, details) = mixed_board("microsoft");
    let details = details.broken("0002");
    let board = StaticBoard::new("microsoft", listings, 20).with_page_down(2);

    let summary = PipelineOrchestrator::new(
        Arc::new(board),
        Arc::new(details),
        Arc::new(MemoryJobStore::new()),
        PipelineSettings::default(),
    )
    .run(RunMode::Full)
    .expect("run completes");

    assert_eq!(summary.processed_count, 19);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.issues.len(), 2);
    assert!(summary
        .issues
        .iter()
        .any(|issue| matches!(issue, RunIssue::PartialPageFailure { page: 2, .. })));
    assert!(summary
        .issues
        .iter()
        .any(|issue| matches!(issue, RunIssue::DetailUnavailable { listing, .. } if listing.ends_with("/0002"))));
}

#[test]
fn postings_without_detail_pages_are_skipped() {
    let listings = vec![posting("apple", 1, "Software Engineer"), posting("apple", 2, "Software Engineer")];
    let details = DetailPages::for_listings(&listings[..1]);

    let summary = PipelineOrchestrator::new(
        Arc::new(StaticBoard::new("apple", listings, 20)),
        Arc::new(details),
        Arc::new(MemoryJobStore::new()),
        PipelineSettings::default(),
    )
    .run(RunMode::Full)
    .expect("run completes");

    assert_eq!(summary.processed_count, 1);
    assert_eq!(summary.issue_count("detail_unavailable"), 1);
}
