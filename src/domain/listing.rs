/// One listing search: a commune (INSEE code) plus an optional freshness
/// filter in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub commune: String,
    pub published_since_days: Option<u32>,
}

impl ListingQuery {
    pub fn new(commune: impl Into<String>) -> Self {
        Self {
            commune: commune.into(),
            published_since_days: None,
        }
    }

    pub fn published_since(mut self, days: Option<u32>) -> Self {
        self.published_since_days = days;
        self
    }
}
