//! Literature sources and the citation field tables shared by other sources

use super::{DetailShape, Endpoint, SeedOrigin, Source};
use dps_common::record::{FieldSpec, RecordSpec};

/// Citation entry of an `Icodes` list
pub static ICODE_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("ICodeID"),
    FieldSpec::keep("AuthorDisplay"),
    FieldSpec::keep("Title"),
];

/// Citation entry of an `Icodes` list on host endpoints, which omit the title
pub static ICODE_AUTHOR_FIELDS: &[FieldSpec] =
    &[FieldSpec::keep("ICodeID"), FieldSpec::keep("AuthorDisplay")];

/// Full reference description, used both for the `cankao` object and the
/// issue code detail endpoint
pub static CANKAO_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("Icode"),
    FieldSpec::keep("Title"),
    FieldSpec::keep("SourceTitle"),
    FieldSpec::keep("IssueAuthor"),
    FieldSpec::keep("AuthorDisplay"),
    FieldSpec::keep("ITypes1"),
    FieldSpec::keep("ITypes"),
    FieldSpec::keep("ITypes2"),
    FieldSpec::keep("KeyWord"),
    FieldSpec::keep("CCname"),
    FieldSpec::keep("PubTime"),
    FieldSpec::keep("Publisher"),
    FieldSpec::keep("Derivation"),
    FieldSpec::keep("TypeCode"),
    FieldSpec::keep("ExecuteDate"),
    FieldSpec::keep("Reference"),
    FieldSpec::keep("AbstractDesc"),
    FieldSpec::keep("TP_AUTHOR"),
    FieldSpec::keep("TP_CREATED"),
    FieldSpec::keep("TP_EDITOR"),
    FieldSpec::keep("TP_MODIFIED"),
    FieldSpec::keep("PublishPerson"),
    FieldSpec::keep("PublishTime"),
    FieldSpec::keep("Status"),
];

/// Reference detail, requested per species id
pub static ISSUE_CODE_DETAIL: Source = Source {
    name: "issue_code_detail",
    description: "Reference literature detail",
    endpoint: Endpoint::Detail {
        path: "/webapi/nb/IssueCode/detail",
        shape: DetailShape::Object,
    },
    seeds: SeedOrigin::SpeciesIds {
        inject: Some("species_id"),
    },
    record: RecordSpec::flat(CANKAO_FIELDS),
};

static FILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::keep("guid"),
    FieldSpec::keep("name"),
    FieldSpec::keep("url"),
];

/// Attached files of a reference, requested per collected reference code
pub static FILE_METADATA: Source = Source {
    name: "file_metadata",
    description: "Attachment files per reference code",
    endpoint: Endpoint::Detail {
        path: "/webapi/nb/common/files",
        shape: DetailShape::List,
    },
    seeds: SeedOrigin::CsvColumn {
        file: "reference_relation.csv",
        column: "icode",
        inject: "icode",
    },
    record: RecordSpec::flat(FILE_FIELDS),
};
