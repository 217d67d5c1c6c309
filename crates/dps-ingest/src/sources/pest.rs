//! Pest relation, host part and diffusion medium sources

use super::{Endpoint, PagedEndpoint, SeedOrigin, Source};
use crate::sources::reference::{CANKAO_FIELDS, ICODE_AUTHOR_FIELDS};
use dps_common::record::{ChildSpec, FieldSpec, RecordSpec};

// ============================================================================
// pest_relation
// ============================================================================

static RELATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SC_GUID"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("PBCharHostRange"),
    FieldSpec::keep("PotentialEcoDesc"),
    FieldSpec::keep("Descrip"),
    FieldSpec::keep("ManagementInfo"),
    FieldSpec::keep("Remark"),
    FieldSpec::keep("ICodeID"),
    FieldSpec::keep("ICodeName"),
    FieldSpec::keep("Page"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
];

static RELATION_CHILDREN: &[ChildSpec] = &[ChildSpec::object("cankao", CANKAO_FIELDS)];

/// Ecological relations and management notes per species
pub static PEST_RELATION: Source = Source {
    name: "pest_relation",
    description: "Ecological relation and management info per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/PestRelationInfo/list",
        seed_params: &["SC_GUID"],
        params: &[("needCk", "true")],
        page_size: 20,
        initial_total: 0,
    }),
    seeds: SeedOrigin::SpeciesIds { inject: None },
    record: RecordSpec::nested(RELATION_FIELDS, RELATION_CHILDREN),
};

// ============================================================================
// pest_host_part
// ============================================================================

static HOST_PART_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("PlantParts"),
    FieldSpec::keep("Peststage"),
    FieldSpec::keep("VisibilityType"),
    FieldSpec::keep("SpreadingWay"),
];

static HOST_PART_CHILDREN: &[ChildSpec] = &[ChildSpec::list("Icodes", ICODE_AUTHOR_FIELDS)];

/// Affected plant parts per species
pub static PEST_HOST_PART: Source = Source {
    name: "pest_host_part",
    description: "Affected host plant parts per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/PestHostPart/list/concat",
        seed_params: &["SC_GUID"],
        params: &[],
        page_size: 18,
        initial_total: 86,
    }),
    seeds: SeedOrigin::SpeciesIds {
        inject: Some("species_id"),
    },
    record: RecordSpec::nested(HOST_PART_FIELDS, HOST_PART_CHILDREN),
};

// ============================================================================
// cm_diffuse_medium
// ============================================================================

static MEDIUM_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("rowid"),
    FieldSpec::keep("TP_GUID"),
    FieldSpec::keep("SC_GUID"),
    FieldSpec::keep("SSNameSci"),
    FieldSpec::keep("SpeciesType"),
    FieldSpec::keep("OB_GUID"),
    FieldSpec::keep("OB_SSNameSci"),
    FieldSpec::keep("Descrip"),
    FieldSpec::keep("MediumType"),
    FieldSpec::keep("ICodeID"),
    FieldSpec::keep("ICodeName"),
    FieldSpec::keep("Page"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
    FieldSpec::keep("Tmp_GUID"),
    FieldSpec::keep("Tmp_SSNameSci"),
    FieldSpec::keep("NamedYear"),
];

/// Organisms that carry and spread a species
pub static CM_DIFFUSE_MEDIUM: Source = Source {
    name: "cm_diffuse_medium",
    description: "Diffusion media per species",
    endpoint: Endpoint::Paged(PagedEndpoint {
        path: "/webapi/nb/CmDiffuseMedium/list",
        seed_params: &["SC_GUID"],
        params: &[],
        page_size: 18,
        initial_total: 1,
    }),
    seeds: SeedOrigin::SpeciesIds {
        inject: Some("species_id"),
    },
    record: RecordSpec::flat(MEDIUM_FIELDS),
};
