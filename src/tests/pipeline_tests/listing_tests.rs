// src/tests/pipeline_tests/listing_tests.rs

use crate::db::documents::{count_documents, get_document, UpsertSink, JOB_LISTINGS};
use crate::domain::ListingQuery;
use crate::pipeline::listings::run_listing_cycle;
use crate::tests::utils::{offers, test_config, test_context, AUTH_URL, SEARCH_URL};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap()
}

fn grant_token(transport: &crate::tests::utils::ScriptedTransport) {
    transport.respond_json(AUTH_URL, 200, json!({"access_token": "tok-1", "expires_in": 1499}));
}

#[test]
fn three_page_scan_upserts_everything() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    grant_token(transport);
    transport.respond_json(SEARCH_URL, 206, json!({"resultats": offers(0, 100)}));
    transport.respond_json(SEARCH_URL, 206, json!({"resultats": offers(100, 100)}));
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(200, 50)}));

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert_eq!(report.pages, 3);
    assert_eq!(report.upserted, 250);
    assert_eq!(report.failures, 0);
    assert!(report.succeeded());
    assert_eq!(count_documents(ctx.db(), JOB_LISTINGS).unwrap(), 250);

    let searches = transport.requests_to(SEARCH_URL);
    let ranges: Vec<_> = searches
        .iter()
        .map(|r| r.query_value("range").unwrap().to_string())
        .collect();
    assert_eq!(ranges, vec!["0-99", "100-199", "200-299"]);
    assert!(searches.iter().all(|r| r.bearer.as_deref() == Some("tok-1")));
}

#[test]
fn auth_failure_issues_no_listing_request() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    transport.respond_json(AUTH_URL, 401, json!({"error": "invalid_client"}));
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(0, 1)}));

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert!(report.auth_failed);
    assert!(transport.requests_to(SEARCH_URL).is_empty());
    assert_eq!(count_documents(ctx.db(), JOB_LISTINGS).unwrap(), 0);
}

#[test]
fn missing_credentials_skip_the_token_call_too() {
    let mut config = test_config();
    config.listing_credential = None;
    let ctx = test_context(config);

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert!(report.auth_failed);
    assert!(ctx.transport().requests().is_empty());
}

#[test]
fn failed_query_does_not_stop_the_next_one() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    grant_token(transport);
    transport.respond_json(SEARCH_URL, 206, json!({"resultats": offers(0, 100)}));
    transport.fail(SEARCH_URL, "connection reset");
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(500, 3)}));

    let queries = [ListingQuery::new("75056"), ListingQuery::new("13055")];
    let report = run_listing_cycle(&ctx, &queries, now());

    assert_eq!(report.failures, 1);
    assert_eq!(report.upserted, 103);
    assert!(!report.succeeded());

    let communes: Vec<_> = transport
        .requests_to(SEARCH_URL)
        .iter()
        .map(|r| r.query_value("commune").unwrap().to_string())
        .collect();
    assert_eq!(communes, vec!["75056", "75056", "13055"]);
}

#[test]
fn bad_record_is_skipped_not_fatal() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    grant_token(transport);
    let mut page = offers(0, 2);
    page.insert(1, json!({"intitule": "sans identifiant"}));
    transport.respond_json(SEARCH_URL, 200, json!({ "resultats": page }));

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert_eq!(report.upserted, 2);
    assert_eq!(report.failures, 1);
    assert_eq!(count_documents(ctx.db(), JOB_LISTINGS).unwrap(), 2);
}

#[test]
fn rerun_refreshes_instead_of_duplicating() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();

    grant_token(transport);
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(0, 3)}));
    run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    let mut changed = offers(0, 3);
    changed[0]["intitule"] = json!("Offre 0 (mise à jour)");
    grant_token(transport);
    transport.respond_json(SEARCH_URL, 200, json!({ "resultats": changed }));
    run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert_eq!(count_documents(ctx.db(), JOB_LISTINGS).unwrap(), 3);
    let stored = get_document(ctx.db(), JOB_LISTINGS, "offer-0").unwrap().unwrap();
    assert_eq!(stored.payload["intitule"], "Offre 0 (mise à jour)");
}

#[test]
fn sweep_runs_after_fetch_and_respects_horizon() {
    let ctx = test_context(test_config());
    let sink = UpsertSink::listings();
    for (id, written) in [
        ("expired", Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap()),
        ("refetched", Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap()),
        ("fresh", Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
    ] {
        sink.upsert(ctx.db(), &json!({"id": id}), written).unwrap();
    }

    let transport = ctx.transport();
    grant_token(transport);
    transport.respond_json(
        SEARCH_URL,
        200,
        json!({"resultats": [{"id": "refetched", "dateCreation": "2024-02-20T00:00:00Z"}]}),
    );

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert_eq!(report.upserted, 1);
    assert_eq!(report.swept, 1);
    assert!(get_document(ctx.db(), JOB_LISTINGS, "expired").unwrap().is_none());
    assert!(get_document(ctx.db(), JOB_LISTINGS, "fresh").unwrap().is_some());
    // posted long ago, but returned by this cycle's fetch
    let kept = get_document(ctx.db(), JOB_LISTINGS, "refetched").unwrap().unwrap();
    assert_eq!(kept.updated_at, now());
}

#[test]
fn sweep_is_skipped_when_auth_fails() {
    let ctx = test_context(test_config());
    UpsertSink::listings()
        .upsert(
            ctx.db(),
            &json!({"id": "old"}),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();
    ctx.transport().respond_raw(AUTH_URL, 503, "maintenance");

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert!(report.auth_failed);
    assert_eq!(report.swept, 0);
    assert_eq!(count_documents(ctx.db(), JOB_LISTINGS).unwrap(), 1);
}

#[test]
fn out_of_range_token_lifetime_does_not_abort_cycle() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    transport.respond_json(
        AUTH_URL,
        200,
        json!({"access_token": "tok", "expires_in": 9_000_000_000_000_000_i64}),
    );
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(0, 2)}));

    let report = run_listing_cycle(&ctx, &[ListingQuery::new("75056")], now());

    assert!(!report.auth_failed);
    assert_eq!(report.upserted, 2);
    assert_eq!(transport.requests_to(AUTH_URL).len(), 1);
}
