//! Request driver
//!
//! Drives one seed's request sequence to completion. Paged sources issue the
//! first page, then exactly one follow-up request per response until the
//! latest server-reported `paging` says the last page has been seen. Detail
//! sources issue a single GET.
//!
//! Failures are local to the seed: a transport error or malformed body stops
//! that seed's sequence and is reported in its [`SeedOutcome`]. Nothing is
//! retried and nothing propagates to other seeds.

use crate::client::PageFetcher;
use crate::sources::{DetailShape, Endpoint, PagedEndpoint, Source};
use dps_common::batch::BatchBuffer;
use dps_common::record::map_record_with;
use dps_common::{DpsError, Record};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Server-reported pagination block.
///
/// Both values are accepted as integers or numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Paging {
    #[serde(deserialize_with = "lenient_u64")]
    pub pagenum: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub totalpage: u64,
}

/// Body of a paginated list response
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub content: Vec<Value>,
    pub paging: Paging,
}

impl PageResponse {
    /// Parse a response body. Missing `content` or `paging`, a non-array
    /// `content`, or non-integer paging values are errors.
    pub fn parse(body: &str) -> dps_common::Result<Self> {
        serde_json::from_str(body).map_err(|e| DpsError::parse(format!("malformed page response: {}", e)))
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("paging value is not an integer: {:?}", s))),
    }
}

/// Position of one seed's paged sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: u64,
    total_pages: u64,
}

impl PageState {
    /// Start at page 1 with the source's placeholder total
    pub fn new(initial_total: u64) -> Self {
        Self {
            page: 1,
            total_pages: initial_total,
        }
    }

    /// Page the next request asks for
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Working total, replaced by every response
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Fold in a response's paging block.
    ///
    /// Returns the page to request next, or `None` once
    /// `pagenum >= totalpage`. A server echoing a page number lower than the
    /// one requested cannot make the sequence go backwards.
    pub fn advance(&mut self, paging: &Paging) -> Option<u64> {
        self.total_pages = paging.totalpage;
        let current = paging.pagenum.max(self.page);
        if current >= self.total_pages {
            return None;
        }
        self.page = current + 1;
        Some(self.page)
    }
}

/// One seed of a source, with the fields its records are stamped with
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    /// Value sent to the endpoint; empty for unseeded sources
    pub key: String,
    /// Leading `(output key, value)` pairs written into every record
    pub fields: Vec<(&'static str, Value)>,
}

impl Seed {
    /// The single seed of an unseeded source
    pub fn unseeded() -> Self {
        Self {
            key: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Stamp every record of this seed with `key = value`
    pub fn with_field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((key, value.into()));
        self
    }
}

/// How one seed's sequence ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedStatus {
    Completed,
    /// The sequence stopped at a failed request
    Failed(String),
}

/// Result of driving one seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seed: String,
    /// Responses received, including a final malformed one
    pub responses: u64,
    /// Records handed to the batch buffer
    pub records: u64,
    pub status: SeedStatus,
}

impl SeedOutcome {
    fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            responses: 0,
            records: 0,
            status: SeedStatus::Completed,
        }
    }

    fn fail(mut self, error: DpsError) -> Self {
        self.status = SeedStatus::Failed(error.to_string());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == SeedStatus::Completed
    }
}

/// Drives request sequences against one site
pub struct RequestDriver {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl RequestDriver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Run `seed`'s whole sequence for `source`, appending every mapped
    /// record to `sink`
    pub async fn drive_seed(&self, source: &Source, seed: &Seed, sink: &BatchBuffer<Record>) -> SeedOutcome {
        let outcome = match &source.endpoint {
            Endpoint::Paged(paged) => self.drive_paged(source, paged, seed, sink).await,
            Endpoint::Detail { shape, .. } => self.drive_detail(source, *shape, seed, sink).await,
        };

        if let SeedStatus::Failed(reason) = &outcome.status {
            error!(
                source = source.name,
                seed = %outcome.seed,
                responses = outcome.responses,
                error = %reason,
                "Request sequence stopped"
            );
        } else {
            debug!(
                source = source.name,
                seed = %outcome.seed,
                responses = outcome.responses,
                records = outcome.records,
                "Request sequence completed"
            );
        }
        outcome
    }

    async fn drive_paged(
        &self,
        source: &Source,
        paged: &PagedEndpoint,
        seed: &Seed,
        sink: &BatchBuffer<Record>,
    ) -> SeedOutcome {
        let mut outcome = SeedOutcome::new(&seed.key);
        let mut state = PageState::new(paged.initial_total);

        loop {
            let request = paged.request(&self.base_url, &seed.key, &state);
            let body = match self.fetcher.fetch(&request).await {
                Ok(body) => body,
                Err(e) => return outcome.fail(e),
            };
            outcome.responses += 1;

            let page = match PageResponse::parse(&body) {
                Ok(page) => page,
                Err(e) => return outcome.fail(e),
            };

            // A zero total means the seed has no data at all
            if page.paging.totalpage == 0 {
                if !page.content.is_empty() {
                    debug!(
                        source = source.name,
                        seed = %seed.key,
                        ignored = page.content.len(),
                        "Ignoring content of a response reporting zero pages"
                    );
                }
            } else {
                outcome.records += emit(source, seed, &page.content, sink);
            }

            if state.advance(&page.paging).is_none() {
                return outcome;
            }
        }
    }

    async fn drive_detail(
        &self,
        source: &Source,
        shape: DetailShape,
        seed: &Seed,
        sink: &BatchBuffer<Record>,
    ) -> SeedOutcome {
        let mut outcome = SeedOutcome::new(&seed.key);

        let request = match source.endpoint.detail_request(&self.base_url, &seed.key) {
            Some(Ok(request)) => request,
            Some(Err(e)) => return outcome.fail(e),
            None => return outcome.fail(DpsError::config(format!("{} is not a detail source", source.name))),
        };

        let body = match self.fetcher.fetch(&request).await {
            Ok(body) => body,
            Err(e) => return outcome.fail(e),
        };
        outcome.responses += 1;

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => return outcome.fail(DpsError::parse(format!("malformed detail response: {}", e))),
        };

        match (shape, value) {
            (DetailShape::Object, item @ Value::Object(_)) => {
                outcome.records += emit(source, seed, std::slice::from_ref(&item), sink);
                outcome
            },
            (DetailShape::List, Value::Array(items)) => {
                outcome.records += emit(source, seed, &items, sink);
                outcome
            },
            (DetailShape::Object, other) => outcome.fail(DpsError::parse(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
            (DetailShape::List, other) => outcome.fail(DpsError::parse(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Map and append records; returns how many were appended
fn emit(source: &Source, seed: &Seed, items: &[Value], sink: &BatchBuffer<Record>) -> u64 {
    let mut appended = 0;
    for item in items {
        if !item.is_object() {
            warn!(source = source.name, seed = %seed.key, kind = json_kind(item), "Skipping non-object item");
            continue;
        }

        let leading = seed.fields.iter().map(|(k, v)| (*k, v.clone()));
        let record = map_record_with(item, &source.record, leading);
        match sink.append(record) {
            Ok(_) => appended += 1,
            Err(e) => error!(source = source.name, seed = %seed.key, error = %e, "Failed to buffer record"),
        }
    }
    appended
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
