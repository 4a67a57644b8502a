use crate::db::runs::get_recent_runs;
use crate::pipeline::{run_cycle, Pipeline};
use crate::tests::utils::{
    air_pollution_body, offers, station_feed_body, test_config, test_context, AIR_URL, AUTH_URL,
    GEO_URL, SEARCH_URL,
};
use chrono::Utc;
use serde_json::json;

#[test]
fn all_runs_each_pipeline_and_logs_it() {
    let ctx = test_context(test_config());
    let transport = ctx.transport();
    transport.respond_json(AUTH_URL, 200, json!({"access_token": "tok"}));
    transport.respond_json(SEARCH_URL, 200, json!({"resultats": offers(0, 2)}));
    transport.respond_json(GEO_URL, 200, json!([{"lat": 48.85, "lon": 2.35}]));
    transport.respond_json(AIR_URL, 200, air_pollution_body(2, 1_710_496_800));
    transport.respond_json(
        "https://waqi.test/feed/Paris/",
        200,
        station_feed_body(5722, 40, "2024-03-15T10:00:00+01:00"),
    );

    let results = run_cycle(&ctx, Pipeline::All, Utc::now());

    let order: Vec<_> = results.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        order,
        vec![Pipeline::Listings, Pipeline::AirQuality, Pipeline::Stations]
    );
    assert!(results.iter().all(|(_, report)| report.succeeded()));

    let runs = ctx
        .db()
        .with_conn(|conn| get_recent_runs(conn, 10))
        .unwrap();
    assert_eq!(runs.len(), 3);
    assert!(runs.iter().all(|r| r.success && r.finished_at.is_some()));

    let listings = runs.iter().find(|r| r.pipeline == "listings").unwrap();
    assert_eq!(listings.records_upserted, Some(2));
    assert_eq!(listings.pages_fetched, Some(1));
}

#[test]
fn auth_failure_is_logged_as_failed_run() {
    let ctx = test_context(test_config());
    ctx.transport()
        .respond_json(AUTH_URL, 400, json!({"error": "invalid_scope"}));

    let results = run_cycle(&ctx, Pipeline::Listings, Utc::now());
    assert_eq!(results.len(), 1);
    assert!(results[0].1.auth_failed);

    let runs = ctx
        .db()
        .with_conn(|conn| get_recent_runs(conn, 10))
        .unwrap();
    assert_eq!(runs.len(), 1);
    assert!(!runs[0].success);
    assert!(runs[0].error_message.is_some());
}
