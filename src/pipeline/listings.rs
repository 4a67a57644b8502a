use crate::auth::{AccessToken, TokenProvider};
use crate::db::{RetentionSweeper, UpsertSink};
use crate::domain::ListingQuery;
use crate::errors::{IngestError, Outcome};
use crate::fetchers::{ListingFetcher, Transport};
use crate::pipeline::context::IngestContext;
use crate::pipeline::report::CycleReport;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Token → paged scan per query → upsert per record → one retention sweep.
pub fn run_listing_cycle<T: Transport>(
    ctx: &IngestContext<T>,
    queries: &[ListingQuery],
    now: DateTime<Utc>,
) -> CycleReport {
    let mut report = CycleReport::default();

    let mut token = match Outcome::from_result(obtain_token(ctx)) {
        Outcome::Success(token) => token,
        Outcome::Fatal(e) | Outcome::Transient(e) => {
            error!(error = %e, "no access token, skipping listing fetches");
            report.auth_failed = true;
            return report;
        }
        Outcome::NotFound => {
            error!("token endpoint returned no token, skipping listing fetches");
            report.auth_failed = true;
            return report;
        }
    };

    let fetcher = ListingFetcher::new(ctx.transport(), &ctx.config.endpoints.listing_search);
    let sink = UpsertSink::listings();

    for query in queries {
        if token.is_expired(Utc::now()) {
            match obtain_token(ctx) {
                Ok(fresh) => token = fresh,
                Err(e) => {
                    error!(error = %e, "token refresh failed, stopping listing fetches");
                    report.auth_failed = true;
                    break;
                }
            }
        }
        ingest_query(ctx, &fetcher, &sink, query, &token, now, &mut report);
    }

    if report.auth_failed {
        info!(%report, "listing cycle cut short, retention sweep skipped");
        return report;
    }

    let sweeper = RetentionSweeper::listings(ctx.config.retention_days);
    match sweeper.sweep(ctx.db(), now) {
        Ok(deleted) => report.swept = deleted,
        Err(e) => {
            warn!(error = %e, "retention sweep failed");
            report.failures += 1;
        }
    }

    info!(%report, "listing cycle finished");
    report
}

fn obtain_token<T: Transport>(ctx: &IngestContext<T>) -> Result<AccessToken, IngestError> {
    let credential = ctx
        .config
        .listing_credential
        .as_ref()
        .ok_or_else(|| IngestError::Auth("CLIENT_ID / CLIENT_SECRET not configured".into()))?;

    TokenProvider::new(ctx.transport(), &ctx.config.endpoints.auth).obtain(credential)
}

/// One query's complete scan. A page failure ends this query only; a write
/// failure skips that record only.
pub fn ingest_query<T: Transport>(
    ctx: &IngestContext<T>,
    fetcher: &ListingFetcher<'_>,
    sink: &UpsertSink,
    query: &ListingQuery,
    token: &AccessToken,
    now: DateTime<Utc>,
    report: &mut CycleReport,
) {
    let mut seen = 0usize;

    for page in fetcher.scan(query, token) {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                warn!(commune = %query.commune, error = %e, "listing scan aborted");
                report.failures += 1;
                break;
            }
        };
        report.pages += 1;

        for record in &page.records {
            seen += 1;
            match sink.upsert(ctx.db(), record, now) {
                Ok(_) => report.upserted += 1,
                Err(e) => {
                    warn!(commune = %query.commune, page = page.number, error = %e, "listing not saved");
                    report.failures += 1;
                }
            }
        }
    }

    info!(commune = %query.commune, records = seen, "listing query done");
}
