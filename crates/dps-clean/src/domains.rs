//! Column tables of every cleaning domain

use crate::tables::{ChildTable, Column, Domain, Rule, TableSpec};

// ============================================================================
// Shared citation tables
// ============================================================================

/// `reference_relation` rows from an `Icodes` list keyed by `species_id`
static ICODE_REFERENCE_COLUMNS: &[Column] = &[
    Column::field("icode", "ICodeID"),
    Column::field("author_display", "AuthorDisplay"),
    Column::field("title", "Title"),
    Column::parent("species_guid", "species_id"),
    Column::empty("id"),
];

static ICODE_REFERENCES: &[ChildTable] = &[ChildTable {
    key: "Icodes",
    table: TableSpec {
        name: "reference_relation",
        columns: ICODE_REFERENCE_COLUMNS,
        rules: &[],
    },
}];

// ============================================================================
// meta
// ============================================================================

static SPECIES_COLUMNS: &[Column] = &[
    Column::field("guid", "TP_GUID"),
    Column::field("scientific_name", "SSNameSci"),
    Column::field("scientific_name_with_authors", "SSName"),
    Column::field("authorship", "NamedYear"),
    Column::field("chinese_name", "SCName"),
    Column::field("english_name", "SEName"),
    Column::field("abbreviation", "SENameAbb"),
    Column::field("classification", "SClass"),
    Column::field("parent_genus", "ParentSsName"),
    Column::field("taxonomic_level", "SLevel"),
    Column::field("sources", "Source"),
    Column::field("confirmation_status", "Status"),
    Column::field("reviewer", "Checker"),
    Column::date("review_time", "CheckTime"),
    Column::field("original_risk_code", "OrgRiskCode"),
    Column::flag("is_species", "IsSpecies"),
    Column::field("author", "TP_AUTHOR"),
    Column::date("created_time", "TP_CREATED"),
    Column::field("editor", "TP_EDITOR"),
    Column::date("modified_time", "TP_MODIFIED"),
    Column::date("temp_created_time", "Temp_CREATED"),
];

static OTHER_NAME_COLUMNS: &[Column] = &[
    Column::field("other_name_type", "SONType"),
    Column::field("named_year", "NamedYear"),
    Column::field("other_name", "SOtherNameSci"),
    Column::parent("species_guid", "TP_GUID"),
];

static META_CHILDREN: &[ChildTable] = &[ChildTable {
    key: "ym",
    table: TableSpec {
        name: "other_names",
        columns: OTHER_NAME_COLUMNS,
        rules: &[],
    },
}];

pub static META: Domain = Domain {
    name: "meta",
    source: "meta",
    table: TableSpec {
        name: "species",
        columns: SPECIES_COLUMNS,
        rules: &[],
    },
    children: META_CHILDREN,
};

// ============================================================================
// species_distribution
// ============================================================================

static DISTRIBUTION_COLUMNS: &[Column] = &[
    Column::field("species_guid", "species_id"),
    Column::field("continent_name", "CCnameContinent"),
    Column::field("country_name", "CCnameCountry"),
    Column::field("province_name", "CCnameProvince"),
    Column::field("description", "Descrip"),
    Column::empty("id"),
];

pub static SPECIES_DISTRIBUTION: Domain = Domain {
    name: "species_distribution",
    source: "species_distribution",
    table: TableSpec {
        name: "species_distribution",
        columns: DISTRIBUTION_COLUMNS,
        rules: &[],
    },
    children: ICODE_REFERENCES,
};

// ============================================================================
// species_host
// ============================================================================

static HOST_COLUMNS: &[Column] = &[
    Column::empty("id"),
    Column::field("species_guid", "species_id"),
    Column::field("host_guid", "HOST_GUID"),
    Column::field("host_name", "HOST_NAME"),
    Column::field("host_name_cn", "HOST_NAME_CN"),
    Column::field("host_types", "HostType"),
];

static HOST_REFERENCE_COLUMNS: &[Column] = &[
    Column::empty("id"),
    Column::parent("species_guid", "species_id"),
    Column::field("icode", "ICodeID"),
    Column::field("author_display", "AuthorDisplay"),
    Column::field("title", "Title"),
];

static HOST_CHILDREN: &[ChildTable] = &[ChildTable {
    key: "Icodes",
    table: TableSpec {
        name: "reference_relation",
        columns: HOST_REFERENCE_COLUMNS,
        rules: &[],
    },
}];

pub static SPECIES_HOST: Domain = Domain {
    name: "species_host",
    source: "species_host",
    table: TableSpec {
        name: "species_host",
        columns: HOST_COLUMNS,
        rules: &[],
    },
    children: HOST_CHILDREN,
};

// ============================================================================
// species_taxonomy
// ============================================================================

static TAXONOMY_COLUMNS: &[Column] = &[
    Column::field("species_guid", "species_TP_GUID"),
    Column::field("taxonomy_guid", "TP_GUID"),
    Column::field("taxonomy_level", "SLevel"),
    Column::field("scientific_name", "SSNameSci"),
    Column::field("chinese_name", "SCName"),
    Column::field("taxonomy_class", "SClass"),
    Column::field("parent_scientific_name", "ParentSsName"),
    Column::empty("id"),
];

pub static SPECIES_TAXONOMY: Domain = Domain {
    name: "species_taxonomy",
    source: "species_parent",
    table: TableSpec {
        name: "species_taxonomy",
        columns: TAXONOMY_COLUMNS,
        rules: &[],
    },
    children: &[],
};

// ============================================================================
// pest_relation
// ============================================================================

static ASSOCIATION_COLUMNS: &[Column] = &[
    Column::field("species_guid", "SC_GUID"),
    Column::field("record_guid", "TP_GUID"),
    Column::field("scientific_name", "SSNameSci"),
    Column::field("host_range", "PBCharHostRange"),
    Column::field("potential_eco_desc", "PotentialEcoDesc"),
    Column::field("description", "Descrip"),
    Column::field("management_info", "ManagementInfo"),
    Column::field("remark", "Remark"),
    Column::field("reference_id", "ICodeID"),
    Column::field("reference_name", "ICodeName"),
    Column::field("page", "Page"),
    Column::field("author", "TP_AUTHOR"),
    Column::date("created_time", "TP_CREATED"),
    Column::field("editor", "TP_EDITOR"),
    Column::date("update_time", "TP_MODIFIED"),
    Column::empty("id"),
];

static CANKAO_REFERENCE_COLUMNS: &[Column] = &[
    Column::field("icode", "Icode"),
    Column::field("author_display", "AuthorDisplay"),
    Column::field("title", "Title"),
    Column::parent("species_guid", "SC_GUID"),
    Column::empty("id"),
];

static RELATION_CHILDREN: &[ChildTable] = &[ChildTable {
    key: "cankao",
    table: TableSpec {
        name: "reference_relation",
        columns: CANKAO_REFERENCE_COLUMNS,
        rules: &[],
    },
}];

pub static PEST_RELATION: Domain = Domain {
    name: "pest_relation",
    source: "pest_relation",
    table: TableSpec {
        name: "species_association",
        columns: ASSOCIATION_COLUMNS,
        rules: &[],
    },
    children: RELATION_CHILDREN,
};

// ============================================================================
// pest_host_part
// ============================================================================

static HOST_PART_COLUMNS: &[Column] = &[
    Column::field("species_guid", "species_id"),
    Column::field("plant_parts", "PlantParts"),
    Column::field("pest_stage", "Peststage"),
    Column::field("visibility_type", "VisibilityType"),
    Column::field("spreading_way", "SpreadingWay"),
];

static HOST_PART_REFERENCE_COLUMNS: &[Column] = &[
    Column::parent("species_guid", "species_id"),
    Column::field("icode", "ICodeID"),
    Column::field("author_display", "AuthorDisplay"),
    Column::empty("title"),
];

static HOST_PART_CHILDREN: &[ChildTable] = &[ChildTable {
    key: "Icodes",
    table: TableSpec {
        name: "reference_relation",
        columns: HOST_PART_REFERENCE_COLUMNS,
        rules: &[Rule::Integer("ICodeID")],
    },
}];

pub static PEST_HOST_PART: Domain = Domain {
    name: "pest_host_part",
    source: "pest_host_part",
    table: TableSpec {
        name: "species_host_part",
        columns: HOST_PART_COLUMNS,
        rules: &[Rule::Uuid("species_id"), Rule::Required("PlantParts")],
    },
    children: HOST_PART_CHILDREN,
};

// ============================================================================
// cm_diffuse_medium
// ============================================================================

static MEDIUM_COLUMNS: &[Column] = &[
    Column::field("species_guid", "species_id"),
    Column::field("record_guid", "TP_GUID"),
    Column::field("scientific_name", "SSNameSci"),
    Column::field("species_type", "SpeciesType"),
    Column::field("medium_guid", "OB_GUID"),
    Column::field("medium_scientific_name", "OB_SSNameSci"),
    Column::field("description", "Descrip"),
    Column::field("medium_type", "MediumType"),
    Column::field("reference_id", "ICodeID"),
    Column::field("reference_name", "ICodeName"),
    Column::field("page", "Page"),
    Column::field("author", "TP_AUTHOR"),
    Column::date("created_time", "TP_CREATED"),
    Column::field("editor", "TP_EDITOR"),
    Column::date("update_time", "TP_MODIFIED"),
    Column::optional_uuid("temp_guid", "Tmp_GUID"),
    Column::field("temp_scientific_name", "Tmp_SSNameSci"),
    Column::field("named_year", "NamedYear"),
];

static MEDIUM_RULES: &[Rule] = &[
    Rule::Uuid("species_id"),
    Rule::Uuid("TP_GUID"),
    Rule::Required("SSNameSci"),
    Rule::Required("SpeciesType"),
    Rule::Required("OB_GUID"),
    Rule::Required("OB_SSNameSci"),
    Rule::Required("MediumType"),
    Rule::Uuid("OB_GUID"),
];

pub static CM_DIFFUSE_MEDIUM: Domain = Domain {
    name: "cm_diffuse_medium",
    source: "cm_diffuse_medium",
    table: TableSpec {
        name: "species_medium",
        columns: MEDIUM_COLUMNS,
        rules: MEDIUM_RULES,
    },
    children: &[],
};

// ============================================================================
// issue_code_detail
// ============================================================================

static REFERENCE_INFO_COLUMNS: &[Column] = &[
    Column::generated_uuid("reference_guid"),
    Column::field("icode", "Icode"),
    Column::field("title", "Title"),
    Column::field("source_title", "SourceTitle"),
    Column::field("authors", "IssueAuthor"),
    Column::field("author_display", "AuthorDisplay"),
    Column::field("primary_category", "ITypes1"),
    Column::field("reference_type", "ITypes"),
    Column::field("content_type", "ITypes2"),
    Column::field("keywords", "KeyWord"),
    Column::field("country", "CCname"),
    Column::date("publish_time", "PubTime"),
    Column::field("publisher", "Publisher"),
    Column::field("source_detail", "Derivation"),
    Column::field("type_code", "TypeCode"),
    Column::date("execute_date", "ExecuteDate"),
    Column::field("reference_text", "Reference"),
    Column::field("abstract", "AbstractDesc"),
    Column::field("creator", "TP_AUTHOR"),
    Column::date("created_time", "TP_CREATED"),
    Column::field("editor", "TP_EDITOR"),
    Column::date("update_time", "TP_MODIFIED"),
    Column::field("publish_person", "PublishPerson"),
    Column::date("publish_record_time", "PublishTime"),
    Column::field("status", "Status"),
];

static REFERENCE_INFO_RULES: &[Rule] = &[
    Rule::Required("Icode"),
    Rule::Required("Title"),
    Rule::Required("IssueAuthor"),
    Rule::Required("TP_AUTHOR"),
    Rule::Date("TP_CREATED"),
];

pub static ISSUE_CODE_DETAIL: Domain = Domain {
    name: "issue_code_detail",
    source: "issue_code_detail",
    table: TableSpec {
        name: "species_reference_info",
        columns: REFERENCE_INFO_COLUMNS,
        rules: REFERENCE_INFO_RULES,
    },
    children: &[],
};

// ============================================================================
// file_metadata
// ============================================================================

static FILE_COLUMNS: &[Column] = &[
    Column::row_id("id"),
    Column::int("icode", "icode"),
    Column::field("name", "name"),
    Column::field("url", "url"),
];

pub static FILE_METADATA: Domain = Domain {
    name: "file_metadata",
    source: "file_metadata",
    table: TableSpec {
        name: "file_metadata",
        columns: FILE_COLUMNS,
        rules: &[],
    },
    children: &[],
};

/// Every domain, in the order the crawl produces their inputs
pub static ALL: &[&Domain] = &[
    &META,
    &SPECIES_DISTRIBUTION,
    &SPECIES_HOST,
    &SPECIES_TAXONOMY,
    &PEST_RELATION,
    &PEST_HOST_PART,
    &CM_DIFFUSE_MEDIUM,
    &ISSUE_CODE_DETAIL,
    &FILE_METADATA,
];

/// Look a domain up by name
pub fn find(name: &str) -> Option<&'static Domain> {
    ALL.iter().copied().find(|d| d.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    ALL.iter().map(|d| d.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_domain_names_are_unique() {
        let names: HashSet<&str> = names().collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_headers_are_unique_per_table() {
        for domain in ALL {
            for table in domain.tables() {
                let headers: Vec<&str> = table.headers().collect();
                let unique: HashSet<&str> = headers.iter().copied().collect();
                assert_eq!(unique.len(), headers.len(), "{}.{}", domain.name, table.name);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(find("species_taxonomy").unwrap().source, "species_parent");
        assert_eq!(find("meta").unwrap().table.columns.len(), 21);
        assert!(find("species_parent").is_none());
    }

    #[test]
    fn test_input_prefix() {
        assert_eq!(SPECIES_TAXONOMY.input_prefix(), "species_parent_batch");
    }
}
