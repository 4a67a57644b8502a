// listings.rs
use crate::auth::AccessToken;
use crate::domain::ListingQuery;
use crate::errors::IngestError;
use crate::fetchers::models::SearchPage;
use crate::fetchers::{ApiRequest, FetchError, Transport};
use serde_json::Value;
use std::iter::FusedIterator;
use tracing::debug;

pub const PAGE_SIZE: u32 = 100;

/// Full result set (or last slice of it) returned.
pub const STATUS_COMPLETE: u16 = 200;
/// More results are available past the requested range.
pub const STATUS_PARTIAL: u16 = 206;

#[derive(Debug)]
pub struct Page {
    pub number: u32,
    pub status: u16,
    pub records: Vec<Value>,
}

/// Inclusive offset range requested for a 1-based page number.
pub fn page_range(page: u32, page_size: u32) -> (u64, u64) {
    let size = u64::from(page_size);
    let page = u64::from(page);
    ((page - 1) * size, page * size - 1)
}

/// A short page ends the scan even when the status claims more data.
pub fn is_last_page(status: u16, record_count: usize, page_size: u32) -> bool {
    record_count < page_size as usize || status == STATUS_COMPLETE
}

pub struct ListingFetcher<'a> {
    transport: &'a dyn Transport,
    endpoint: &'a str,
    page_size: u32,
}

impl<'a> ListingFetcher<'a> {
    pub fn new(transport: &'a dyn Transport, endpoint: &'a str) -> Self {
        Self {
            transport,
            endpoint,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Lazily walk the pages for `query`. Nothing is requested until the
    /// iterator is polled.
    pub fn scan<'q>(&'q self, query: &'q ListingQuery, token: &'q AccessToken) -> PageScan<'q> {
        PageScan {
            fetcher: self,
            query,
            token,
            next_page: 1,
            finished: false,
        }
    }

    fn fetch_page(
        &self,
        query: &ListingQuery,
        token: &AccessToken,
        page: u32,
    ) -> Result<Page, FetchError> {
        let (start, end) = page_range(page, self.page_size);

        let mut request = ApiRequest::get(self.endpoint)
            .query("commune", query.commune.as_str())
            .query("range", format!("{start}-{end}"))
            .bearer(token.secret());
        if let Some(days) = query.published_since_days {
            request = request.query("publieeDepuis", days.to_string());
        }

        let response = self.transport.send(&request)?;
        if response.status != STATUS_COMPLETE && response.status != STATUS_PARTIAL {
            return Err(FetchError::unexpected_status(response.status, &response.body));
        }

        let parsed: SearchPage = response.json()?;
        debug!(
            commune = %query.commune,
            page,
            status = response.status,
            records = parsed.resultats.len(),
            "fetched listing page"
        );

        Ok(Page {
            number: page,
            status: response.status,
            records: parsed.resultats,
        })
    }
}

/// Finite, non-restartable sequence of pages. The first error ends it.
pub struct PageScan<'q> {
    fetcher: &'q ListingFetcher<'q>,
    query: &'q ListingQuery,
    token: &'q AccessToken,
    next_page: u32,
    finished: bool,
}

impl Iterator for PageScan<'_> {
    type Item = Result<Page, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let page = self.next_page;
        match self.fetcher.fetch_page(self.query, self.token, page) {
            Ok(fetched) => {
                if is_last_page(fetched.status, fetched.records.len(), self.fetcher.page_size) {
                    self.finished = true;
                } else {
                    self.next_page += 1;
                }
                Some(Ok(fetched))
            }
            Err(source) => {
                self.finished = true;
                Some(Err(IngestError::PageFetch { page, source }))
            }
        }
    }
}

impl FusedIterator for PageScan<'_> {}
