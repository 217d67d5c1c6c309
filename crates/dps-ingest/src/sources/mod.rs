//! Registry of crawlable data sources
//!
//! Each [`Source`] is pure data: where to send requests, how its seeds are
//! obtained, and the field table its records are projected onto. The request
//! driver and the crawl orchestrator are generic over all of them.

mod pest;
mod reference;
mod species;

use crate::client::{detail_url, endpoint_url, FetchRequest};
use crate::driver::PageState;
use dps_common::record::RecordSpec;
use dps_common::Result;

pub use pest::{CM_DIFFUSE_MEDIUM, PEST_HOST_PART, PEST_RELATION};
pub use reference::{
    CANKAO_FIELDS, FILE_METADATA, ICODE_AUTHOR_FIELDS, ICODE_FIELDS, ISSUE_CODE_DETAIL,
};
pub use species::{
    META, PESTS, SPECIES_BASIC_INFO, SPECIES_DISTRIBUTION, SPECIES_HOST, SPECIES_PARENT,
};

/// A paginated form-POST list endpoint
#[derive(Debug, Clone, Copy)]
pub struct PagedEndpoint {
    pub path: &'static str,
    /// Form keys that carry the seed value
    pub seed_params: &'static [&'static str],
    /// Fixed form fields sent with every page
    pub params: &'static [(&'static str, &'static str)],
    /// Records requested per page (`paging[pagecount]`)
    pub page_size: u32,
    /// Total page count assumed before the first response corrects it
    pub initial_total: u64,
}

impl PagedEndpoint {
    /// Build the request for the page `state` currently points at
    pub fn request(&self, base_url: &str, seed: &str, state: &PageState) -> FetchRequest {
        let mut form: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        form.extend(self.seed_params.iter().map(|k| (k.to_string(), seed.to_string())));
        form.push(("paging[pagecount]".to_string(), self.page_size.to_string()));
        form.push(("paging[pagenum]".to_string(), state.page().to_string()));
        form.push(("paging[totalpage]".to_string(), state.total_pages().to_string()));

        FetchRequest::Form {
            url: endpoint_url(base_url, self.path),
            form,
        }
    }
}

/// What a detail endpoint returns for one seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailShape {
    /// A single JSON object, one record
    Object,
    /// A JSON array of objects, one record each
    List,
}

/// Where requests for a source go
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Paged(PagedEndpoint),
    /// `GET {path}/{seed}`, not paginated
    Detail {
        path: &'static str,
        shape: DetailShape,
    },
}

impl Endpoint {
    /// Request for a detail endpoint; paged endpoints go through
    /// [`PagedEndpoint::request`]
    pub fn detail_request(&self, base_url: &str, seed: &str) -> Option<Result<FetchRequest>> {
        match self {
            Endpoint::Detail { path, .. } => {
                Some(detail_url(base_url, path, seed).map(|url| FetchRequest::Get { url }))
            },
            Endpoint::Paged(_) => None,
        }
    }
}

/// How the seed identifiers of a source are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrigin {
    /// One sequence without a seed value
    Unseeded,
    /// Species GUIDs from `species_id/species_ids_{n}.json`.
    /// `inject` names the output field the GUID is copied into, if any.
    SpeciesIds { inject: Option<&'static str> },
    /// A field of another source's batch files.
    /// The seed is written to `inject`; `companion` copies a second field of
    /// the same upstream record as `(source key, output key)`.
    BatchField {
        source: &'static str,
        field: &'static str,
        inject: &'static str,
        companion: Option<(&'static str, &'static str)>,
    },
    /// A column of a CSV file under the cleaned data directory
    CsvColumn {
        file: &'static str,
        column: &'static str,
        inject: &'static str,
    },
}

/// One crawlable data source
#[derive(Debug, Clone, Copy)]
pub struct Source {
    /// Also the output directory and batch file prefix
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: Endpoint,
    pub seeds: SeedOrigin,
    pub record: RecordSpec,
}

impl Source {
    /// Prefix of this source's batch files, `{name}_batch`
    pub fn batch_prefix(&self) -> String {
        format!("{}_batch", self.name)
    }
}

/// Every source in crawl dependency order
pub static ALL: &[&Source] = &[
    &PESTS,
    &META,
    &SPECIES_DISTRIBUTION,
    &SPECIES_BASIC_INFO,
    &SPECIES_HOST,
    &SPECIES_PARENT,
    &PEST_RELATION,
    &PEST_HOST_PART,
    &CM_DIFFUSE_MEDIUM,
    &ISSUE_CODE_DETAIL,
    &FILE_METADATA,
];

/// Look a source up by name
pub fn find(name: &str) -> Option<&'static Source> {
    ALL.iter().copied().find(|s| s.name == name)
}

/// Names of all registered sources
pub fn names() -> impl Iterator<Item = &'static str> {
    ALL.iter().map(|s| s.name)
}
