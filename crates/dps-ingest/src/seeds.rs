//! Seed loading
//!
//! Turns a source's [`SeedOrigin`] into the list of seeds to crawl. Seed
//! files are read in numeric suffix order; an unreadable file is skipped
//! with a warning while a missing input directory or file is an error.

use crate::config::CrawlConfig;
use crate::driver::Seed;
use crate::sources::{SeedOrigin, Source};
use dps_common::files::{numbered_files, read_csv_column, read_json_array};
use dps_common::record::value_text;
use dps_common::Result;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Prefix of species id seed files, `species_ids_{n}.json`
pub const SPECIES_ID_PREFIX: &str = "species_ids";

/// Load every seed of `source`
pub fn load_seeds(source: &Source, config: &CrawlConfig) -> Result<Vec<Seed>> {
    let seeds = match source.seeds {
        SeedOrigin::Unseeded => vec![Seed::unseeded()],
        SeedOrigin::SpeciesIds { inject } => read_id_files(&config.species_id_dir(), SPECIES_ID_PREFIX)?
            .into_iter()
            .map(|id| match inject {
                Some(field) => Seed::new(id.clone()).with_field(field, id),
                None => Seed::new(id),
            })
            .collect(),
        SeedOrigin::BatchField {
            source: upstream,
            field,
            inject,
            companion,
        } => read_batch_field(&config.source_dir(upstream), upstream, field, inject, companion)?,
        SeedOrigin::CsvColumn { file, column, inject } => {
            read_csv_column(&config.cleaned_dir.join(file), column)?
                .into_iter()
                .map(|value| Seed::new(value.clone()).with_field(inject, value))
                .collect()
        },
    };

    info!(source = source.name, seeds = seeds.len(), "Loaded seeds");
    Ok(seeds)
}

/// Read `{prefix}_{n}.json` files holding JSON arrays of strings
pub fn read_id_files(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for file in numbered_files(dir, prefix, "json")? {
        let items = match read_json_array(&file.path) {
            Ok(items) => items,
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Skipping unreadable seed file");
                continue;
            },
        };

        for item in items {
            match item {
                Value::String(id) if !id.trim().is_empty() => ids.push(id.trim().to_string()),
                other => warn!(file = %file.path.display(), value = %other, "Skipping invalid seed id"),
            }
        }
    }
    Ok(ids)
}

/// Seeds taken from one field of another source's batch files
fn read_batch_field(
    dir: &Path,
    upstream: &str,
    field: &str,
    inject: &'static str,
    companion: Option<(&'static str, &'static str)>,
) -> Result<Vec<Seed>> {
    let prefix = format!("{}_batch", upstream);
    let mut seeds = Vec::new();

    for file in numbered_files(dir, &prefix, "json")? {
        let records = match read_json_array(&file.path) {
            Ok(records) => records,
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Skipping unreadable batch file");
                continue;
            },
        };

        for record in records {
            let Some(key) = record.get(field).and_then(value_text).filter(|v| !v.is_empty()) else {
                warn!(file = %file.path.display(), field, "Skipping record without seed field");
                continue;
            };

            let mut seed = Seed::new(key.clone()).with_field(inject, key);
            if let Some((source_key, output_key)) = companion {
                let value = record.get(source_key).cloned().unwrap_or(Value::Null);
                seed = seed.with_field(output_key, value);
            }
            seeds.push(seed);
        }
    }
    Ok(seeds)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sources;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> CrawlConfig {
        CrawlConfig {
            data_dir: dir.path().join("data"),
            cleaned_dir: dir.path().join("cleaned"),
            ..CrawlConfig::default()
        }
    }

    #[test]
    fn test_species_ids_in_numeric_order() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let ids = config.species_id_dir();
        std::fs::create_dir_all(&ids).unwrap();
        std::fs::write(ids.join("species_ids_10.json"), r#"["c"]"#).unwrap();
        std::fs::write(ids.join("species_ids_2.json"), r#"["b", 7, ""]"#).unwrap();
        std::fs::write(ids.join("species_ids_1.json"), r#"["a"]"#).unwrap();
        std::fs::write(ids.join("species_ids_3.json"), "not json").unwrap();

        let seeds = load_seeds(&sources::SPECIES_HOST, &config).unwrap();
        let keys: Vec<&str> = seeds.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(seeds[0].fields, vec![("species_id", json!("a"))]);
    }

    #[test]
    fn test_species_ids_without_injection() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(config.species_id_dir()).unwrap();
        std::fs::write(config.species_id_dir().join("species_ids_1.json"), r#"["a"]"#).unwrap();

        let seeds = load_seeds(&sources::META, &config).unwrap();
        assert!(seeds[0].fields.is_empty());
    }

    #[test]
    fn test_missing_seed_directory_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_seeds(&sources::META, &config_in(&dir)).is_err());
    }

    #[test]
    fn test_unseeded_source_has_one_seed() {
        let dir = TempDir::new().unwrap();
        let seeds = load_seeds(&sources::PESTS, &config_in(&dir)).unwrap();
        assert_eq!(seeds, vec![Seed::unseeded()]);
    }

    #[test]
    fn test_parent_seeds_from_meta_batches() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let meta = config.source_dir("meta");
        std::fs::create_dir_all(&meta).unwrap();
        std::fs::write(
            meta.join("meta_batch_1.json"),
            json!([
                {"TP_GUID": "g1", "SSNameSci": "Bursaphelenchus xylophilus"},
                {"TP_GUID": "g2", "SSNameSci": null}
            ])
            .to_string(),
        )
        .unwrap();

        let seeds = load_seeds(&sources::SPECIES_PARENT, &config).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].key, "Bursaphelenchus xylophilus");
        assert_eq!(seeds[0].fields, vec![
            ("species_SSNameSci", json!("Bursaphelenchus xylophilus")),
            ("species_TP_GUID", json!("g1")),
        ]);
    }

    #[test]
    fn test_reference_codes_from_csv() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(&config.cleaned_dir).unwrap();
        std::fs::write(
            config.cleaned_dir.join("reference_relation.csv"),
            "\u{feff}icode\n101\n 102 \n",
        )
        .unwrap();

        let seeds = load_seeds(&sources::FILE_METADATA, &config).unwrap();
        let keys: Vec<&str> = seeds.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["101", "102"]);
        assert_eq!(seeds[1].fields, vec![("icode", json!("102"))]);
    }

    #[test]
    fn test_csv_without_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.csv");
        std::fs::write(&path, "code\n1\n").unwrap();
        assert!(read_csv_column(&path, "icode").is_err());
    }
}
