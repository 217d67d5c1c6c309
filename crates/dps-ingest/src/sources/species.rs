//! Species catalogue sources: the pest list, species detail pages and the
//! per-species distribution, basic info, host and taxonomy endpoints

use super::{DetailShape, Endpoint, PagedEndpoint, SeedOrigin, Source};
use crate::sources::reference::{CANKAO_FIELDS, ICODE_AUTHOR_FIELDS, ICODE_FIELDS};
use dps_common::record::{ChildSpec, FieldSpec, RecordSpec};

// ============================================================================
// pests
// ============================================================================

static PEST_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("SSName"),
    FieldSpec::keep("NamedYear"),
    FieldSpec::keep("SCName"),
    FieldSpec::keep("SEName"),
    FieldSpec::keep("SENameAbb"),
    FieldSpec::keep("SClass"),
    FieldSpec::keep("ParentSsName"),
    FieldSpec::keep("SLevel"),
    FieldSpec::keep("SLevel2"),
    FieldSpec::keep("Source"),
    FieldSpec::keep("Status"),
    FieldSpec::keep("Checker"),
    FieldSpec::keep("CheckTime"),
    FieldSpec::keep("OrgRiskCode"),
    FieldSpec::keep("IsSpecies"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
    FieldSpec::keep("Temp_CREATED"),
    FieldSpec::keep("CHECKER_ID"),
    FieldSpec::keep("CHECKER_NAME"),
    FieldSpec::keep("ScType"),
];

/// Full list of harmful organisms, one unseeded sequence
pub static PESTS: Source = Source {
    name: "pests",
    description: "Harmful organism list",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/SpeciesCode/list",
        seed_params: &[],
        params: &[
            ("key", ""),
            ("wzType", "有害生物"),
            ("filterType", "包含"),
            ("orderBy", "TP_MODIFIED desc ,TP_CREATED desc"),
        ],
        page_size: 5000,
        initial_total: 0,
    }),
    seeds: SeedOrigin::Unseeded,
    record: RecordSpec::flat(PEST_FIELDS),
};

// ============================================================================
// meta
// ============================================================================

static META_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("SSName"),
    FieldSpec::keep("NamedYear"),
    FieldSpec::keep("SCName"),
    FieldSpec::keep("SEName"),
    FieldSpec::keep("SENameAbb"),
    FieldSpec::keep("SClass"),
    FieldSpec::keep("ParentSsName"),
    FieldSpec::keep("SLevel"),
    FieldSpec::keep("SLevel2"),
    FieldSpec::keep("Source"),
    FieldSpec::keep("Status"),
    FieldSpec::keep("Checker"),
    FieldSpec::keep("CheckTime"),
    FieldSpec::keep("OrgRiskCode"),
    FieldSpec::keep("IsSpecies"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
    FieldSpec::keep("Temp_CREATED"),
];

/// Synonyms of a species
static YM_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("SONType"),
    FieldSpec::keep("NamedYear"),
    FieldSpec::keep("SOtherNameSci"),
];

static META_CHILDREN: &[ChildSpec] = &[ChildSpec::list("ym", YM_FIELDS)];

/// Species detail page, including synonyms
pub static META: Source = Source {
    name: "meta",
    description: "Species detail with synonym list",
    endpoint: Endpoint::Detail {
        path: "/webapi/nb/home/code/detail",
        shape: DetailShape::Object,
    },
    seeds: SeedOrigin::SpeciesIds { inject: None },
    record: RecordSpec::nested(META_FIELDS, META_CHILDREN),
};

// ============================================================================
// species_distribution
// ============================================================================

static DISTRIBUTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("CCnameContinent"),
    FieldSpec::keep("CCnameCountry"),
    FieldSpec::keep("CCnameProvince"),
    FieldSpec::keep("Descrip"),
];

static DISTRIBUTION_CHILDREN: &[ChildSpec] = &[ChildSpec::list("Icodes", ICODE_FIELDS)];

/// Geographic distribution of a species
pub static SPECIES_DISTRIBUTION: Source = Source {
    name: "species_distribution",
    description: "Geographic distribution per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/SpeciesDistribution/list/concat",
        seed_params: &["yb", "SC_GUID"],
        params: &[
            ("needCk", "true"),
            ("selectContinent[country]", ""),
            ("continent", ""),
        ],
        page_size: 5000,
        initial_total: 0,
    }),
    seeds: SeedOrigin::SpeciesIds {
        inject: Some("species_id"),
    },
    record: RecordSpec::nested(DISTRIBUTION_FIELDS, DISTRIBUTION_CHILDREN),
};

// ============================================================================
// species_basic_info
// ============================================================================

static BASIC_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SC_GUID"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("SEName"),
    FieldSpec::keep("BiologicalProperties"),
    FieldSpec::keep("MorphologicalCharacteristics"),
    FieldSpec::keep("DetectionMethod"),
    FieldSpec::keep("DistributionDescription"),
    FieldSpec::keep("ICodeID"),
    FieldSpec::keep("ICodeName"),
    FieldSpec::keep("Page"),
    FieldSpec::keep("Remark"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
    FieldSpec::keep("Temp_CREATED"),
    FieldSpec::keep("Temp_Morp"),
];

static BASIC_INFO_CHILDREN: &[ChildSpec] = &[ChildSpec::object("cankao", CANKAO_FIELDS)];

/// Biology, morphology and detection notes per species
pub static SPECIES_BASIC_INFO: Source = Source {
    name: "species_basic_info",
    description: "Biological and morphological description per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/SpeciesBasicInfo/list",
        seed_params: &["SC_GUID"],
        params: &[("needCk", "true")],
        page_size: 200,
        initial_total: 0,
    }),
    seeds: SeedOrigin::SpeciesIds { inject: None },
    record: RecordSpec::nested(BASIC_INFO_FIELDS, BASIC_INFO_CHILDREN),
};

// ============================================================================
// species_host
// ============================================================================

static HOST_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("HOST_GUID"),
    FieldSpec::keep("HOST_NAME"),
    FieldSpec::keep("HOST_NAME_CN"),
    FieldSpec::keep("HostType"),
];

static HOST_CHILDREN: &[ChildSpec] = &[ChildSpec::list("Icodes", ICODE_AUTHOR_FIELDS)];

/// Host plants of a species
pub static SPECIES_HOST: Source = Source {
    name: "species_host",
    description: "Host plants per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/SpeciesHost/list/concat",
        seed_params: &["SC_GUID"],
        params: &[("needCk", "true"), ("key", "")],
        page_size: 5000,
        initial_total: 86,
    }),
    seeds: SeedOrigin::SpeciesIds {
        inject: Some("species_id"),
    },
    record: RecordSpec::nested(HOST_FIELDS, HOST_CHILDREN),
};

// ============================================================================
// species_parent
// ============================================================================

static PARENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("ParentSsName"),
    FieldSpec::keep("SLevel"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SClass"),
    FieldSpec::keep("SCName"),
];

/// Taxonomic ancestors, requested by scientific name
pub static SPECIES_PARENT: Source = Source {
    name: "species_parent",
    description: "Taxonomic parent chain per species",
    endpoint: Endpoint::Detail {
        path: "/webapi/nb/SpeciesCode/ParentList",
        shape: DetailShape::List,
    },
    seeds: SeedOrigin::BatchField {
        source: "meta",
        field: "SSNameSci",
        inject: "species_SSNameSci",
        companion: Some(("TP_GUID", "species_TP_GUID")),
    },
    record: RecordSpec::flat(PARENT_FIELDS),
};
