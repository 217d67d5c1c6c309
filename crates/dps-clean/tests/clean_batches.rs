//! Batch files written by the shared batch buffer, cleaned into CSV tables

use dps_clean::config::CleanConfig;
use dps_clean::{clean_domain, collect_references, domains};
use dps_common::batch::BatchBuffer;
use dps_common::Record;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

const PINE_NEMATODE: &str = "0b7d1c56-3e2f-4a8b-9c0d-1e2f3a4b5c6d";
const RED_PALM_WEEVIL: &str = "5a6b7c8d-9e0f-4a1b-8c2d-3e4f5a6b7c8d";

fn config_in(dir: &TempDir) -> CleanConfig {
    CleanConfig {
        data_dir: dir.path().join("data"),
        cleaned_dir: dir.path().join("cleaned"),
        csv_bom: true,
    }
}

fn write_batches(config: &CleanConfig, source: &str, threshold: usize, records: Vec<serde_json::Value>) {
    let buffer: BatchBuffer<Record> =
        BatchBuffer::new(config.input_dir(source), format!("{}_batch", source), threshold).unwrap();
    for value in records {
        buffer.append(Record::from_value(value)).unwrap();
    }
    buffer.finalize().unwrap();
}

/// Rows of a CSV file as header -> value maps
fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    reader
        .records()
        .map(|row| {
            let row = row.unwrap();
            headers.iter().cloned().zip(row.iter().map(str::to_string)).collect()
        })
        .collect()
}

#[test]
fn meta_batches_round_trip_into_species_tables() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_batches(
        &config,
        "meta",
        1,
        vec![
            json!({
                "TP_GUID": PINE_NEMATODE,
                "SSNameSci": "Bursaphelenchus xylophilus",
                "SCName": "松材线虫",
                "IsSpecies": 1,
                "TP_CREATED": "2024-12-20 10:00:31.000",
                "TP_MODIFIED": "2024-12-21 09:15:00",
                "CheckTime": "not a date",
                "ym": [
                    {"SONType": "异名", "NamedYear": "1934", "SOtherNameSci": "Aphelenchoides xylophilus"},
                    {"SONType": "异名", "SOtherNameSci": "Bursaphelenchus lignicolus"}
                ]
            }),
            json!({"TP_GUID": RED_PALM_WEEVIL, "SSNameSci": "Rhynchophorus ferrugineus", "IsSpecies": "0"}),
        ],
    );

    let summary = clean_domain(&domains::META, &config).unwrap();
    assert_eq!(summary.files_read, 2);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.child_rows_written, 2);
    assert_eq!(summary.date_warnings, 1);

    let out = config.output_dir("meta");
    let species = read_rows(&out.join("species_batch_1.csv"));
    assert_eq!(species.len(), 1);
    assert_eq!(species[0]["guid"], PINE_NEMATODE);
    assert_eq!(species[0]["scientific_name"], "Bursaphelenchus xylophilus");
    assert_eq!(species[0]["chinese_name"], "松材线虫");
    assert_eq!(species[0]["is_species"], "true");
    assert_eq!(species[0]["created_time"], "2024-12-20 10:00:31");
    assert_eq!(species[0]["modified_time"], "2024-12-21 09:15:00");
    assert_eq!(species[0]["review_time"], "");

    let names = read_rows(&out.join("other_names_batch_1.csv"));
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|row| row["species_guid"] == PINE_NEMATODE));
    assert_eq!(names[1]["named_year"], "");

    let second = read_rows(&out.join("species_batch_2.csv"));
    assert_eq!(second[0]["is_species"], "false");
    // No synonyms in the second batch, so no child file
    assert!(!out.join("other_names_batch_2.csv").exists());

    let raw = std::fs::read(out.join("species_batch_1.csv")).unwrap();
    assert!(raw.starts_with("\u{feff}guid,".as_bytes()));
}

#[test]
fn skipped_records_leave_siblings_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let medium = |species: &str, ob: &str, medium_type: &str| {
        json!({
            "species_id": species,
            "TP_GUID": RED_PALM_WEEVIL,
            "SSNameSci": "Rhynchophorus ferrugineus",
            "SpeciesType": "害虫",
            "OB_GUID": ob,
            "OB_SSNameSci": "Phoenix dactylifera",
            "MediumType": medium_type,
            "Tmp_GUID": "",
            "TP_CREATED": "2022-01-01 00:00:00.000"
        })
    };
    write_batches(
        &config,
        "cm_diffuse_medium",
        10,
        vec![
            medium(PINE_NEMATODE, RED_PALM_WEEVIL, "苗木"),
            medium(PINE_NEMATODE, RED_PALM_WEEVIL, ""),
            medium("broken", RED_PALM_WEEVIL, "苗木"),
            medium(PINE_NEMATODE, "not-a-guid", "苗木"),
            medium(RED_PALM_WEEVIL, PINE_NEMATODE, "原木"),
        ],
    );

    let summary = clean_domain(&domains::CM_DIFFUSE_MEDIUM, &config).unwrap();
    assert_eq!(summary.records_read, 5);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.records_skipped, 3);

    let rows = read_rows(&config.output_dir("cm_diffuse_medium").join("species_medium_batch_1.csv"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["medium_type"], "苗木");
    assert_eq!(rows[1]["medium_type"], "原木");
    assert_eq!(rows[1]["created_time"], "2022-01-01 00:00:00");
    assert_eq!(rows[1]["temp_guid"], "");
}

#[test]
fn reference_info_requires_a_creation_date() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let reference = |created: &str| {
        json!({
            "species_id": PINE_NEMATODE,
            "Icode": 1201,
            "Title": "松材线虫病防治技术",
            "IssueAuthor": "张三",
            "TP_AUTHOR": "admin",
            "TP_CREATED": created,
            "PubTime": "2010-06-01 00:00:00"
        })
    };
    write_batches(
        &config,
        "issue_code_detail",
        10,
        vec![reference("2020-02-02 02:02:02.500"), reference("someday")],
    );

    let summary = clean_domain(&domains::ISSUE_CODE_DETAIL, &config).unwrap();
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.records_skipped, 1);

    let rows = read_rows(&config.output_dir("issue_code_detail").join("species_reference_info_batch_1.csv"));
    assert_eq!(rows[0]["icode"], "1201");
    assert_eq!(rows[0]["created_time"], "2020-02-02 02:02:02");
    assert_eq!(rows[0]["publish_time"], "2010-06-01 00:00:00");
    assert_eq!(rows[0]["reference_guid"].len(), 36);
}

#[test]
fn unreadable_batch_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_batches(
        &config,
        "species_parent",
        10,
        vec![json!({"species_TP_GUID": PINE_NEMATODE, "TP_GUID": RED_PALM_WEEVIL, "SLevel": "属"})],
    );
    std::fs::write(config.input_dir("species_parent").join("species_parent_batch_2.json"), "{oops").unwrap();

    let summary = clean_domain(&domains::SPECIES_TAXONOMY, &config).unwrap();
    assert_eq!(summary.files_read, 1);
    assert_eq!(summary.files_skipped, 1);

    let rows = read_rows(&config.output_dir("species_taxonomy").join("species_taxonomy_batch_1.csv"));
    assert_eq!(rows[0]["species_guid"], PINE_NEMATODE);
    assert_eq!(rows[0]["taxonomy_level"], "属");
}

#[test]
fn child_tables_feed_reference_collection() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_batches(
        &config,
        "species_host",
        10,
        vec![
            json!({"species_id": PINE_NEMATODE, "HOST_NAME": "Pinus massoniana", "Icodes": [{"ICodeID": 88}, {"ICodeID": 7}]}),
            json!({"species_id": RED_PALM_WEEVIL, "HOST_NAME": "Cocos nucifera", "Icodes": [{"ICodeID": 88}]}),
        ],
    );
    write_batches(
        &config,
        "file_metadata",
        10,
        vec![
            json!({"icode": "88", "guid": "f1", "name": "report.pdf", "url": "/files/report.pdf"}),
            json!({"icode": "n/a", "name": "scan.jpg"}),
        ],
    );

    clean_domain(&domains::SPECIES_HOST, &config).unwrap();
    clean_domain(&domains::FILE_METADATA, &config).unwrap();

    let files = read_rows(&config.output_dir("file_metadata").join("file_metadata_batch_1.csv"));
    assert_eq!(files[0]["id"], "1");
    assert_eq!(files[0]["icode"], "88");
    assert_eq!(files[1]["id"], "2");
    assert_eq!(files[1]["icode"], "");
    assert_eq!(files[1]["url"], "");

    let summary = collect_references(&config.cleaned_dir, config.csv_bom).unwrap();
    assert_eq!(summary.icodes, 2);
    let codes: Vec<String> = read_rows(summary.output.as_deref().unwrap())
        .into_iter()
        .map(|row| row["icode"].clone())
        .collect();
    assert_eq!(codes, vec!["7", "88"]);
}
