use crate::config::AppConfig;
use crate::types::{Record, SuitabilityCategory};
use anyhow::Result;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

const COL_MUNICIPALITY: &str = "Municipio";
const COL_CATEGORY: &str = "Aptitud";
const COL_AREA: &str = "Área (ha)";
const COL_MUNICIPALITY_CODE: &str = "Código municipio";
const COL_DEPARTMENT_CODE: &str = "Código departamento";

const MUNICIPALITY_CODE_WIDTH: usize = 5;
const DEPARTMENT_CODE_WIDTH: usize = 2;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{column}' not found in header")]
    MissingColumn { column: String },
    #[error("row {row}: missing value for column '{column}'")]
    MissingValue { row: usize, column: String },
    #[error("row {row}: cannot parse area value '{value}'")]
    BadArea { row: usize, value: String },
    #[error("row {row}: unknown suitability category '{value}'")]
    UnknownCategory { row: usize, value: String },
}

/// Loads the canonical dataset from a delimited file with the Spanish source
/// headers. Area values may carry thousands separators; code fields are
/// left-padded to their fixed widths.
pub fn load_records(path: &Path) -> Result<Vec<Record>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file)
}

fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, LoadError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let col = |name: &str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                column: name.to_string(),
            })
    };

    let name_idx = col(COL_MUNICIPALITY)?;
    let category_idx = col(COL_CATEGORY)?;
    let area_idx = col(COL_AREA)?;
    let mun_code_idx = col(COL_MUNICIPALITY_CODE)?;
    let dep_code_idx = col(COL_DEPARTMENT_CODE)?;

    let mut records = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        // Header is line 1; data rows start at 2.
        let row = i + 2;
        let record = result?;

        let field = |idx: usize, column: &str| -> Result<String, LoadError> {
            match record.get(idx).map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(LoadError::MissingValue {
                    row,
                    column: column.to_string(),
                }),
            }
        };

        let category_label = field(category_idx, COL_CATEGORY)?;
        let category = SuitabilityCategory::parse(&category_label).ok_or_else(|| {
            LoadError::UnknownCategory {
                row,
                value: category_label.clone(),
            }
        })?;

        let area_raw = field(area_idx, COL_AREA)?;
        let area_ha = parse_area(&area_raw).ok_or_else(|| LoadError::BadArea {
            row,
            value: area_raw.clone(),
        })?;

        records.push(Record {
            municipality_code: pad_code(
                &field(mun_code_idx, COL_MUNICIPALITY_CODE)?,
                MUNICIPALITY_CODE_WIDTH,
            ),
            department_code: pad_code(
                &field(dep_code_idx, COL_DEPARTMENT_CODE)?,
                DEPARTMENT_CODE_WIDTH,
            ),
            municipality_name: field(name_idx, COL_MUNICIPALITY)?,
            category,
            area_ha,
        });
    }

    Ok(records)
}

/// Applies the configured load-failure policy: substitute the fallback
/// dataset with a logged warning, or propagate and abort startup.
pub fn load_or_fallback(config: &AppConfig) -> Result<Vec<Record>> {
    match load_records(&config.input.data_csv) {
        Ok(records) => {
            tracing::info!(
                "Loaded {} records from {:?}",
                records.len(),
                config.input.data_csv
            );
            Ok(records)
        }
        Err(err) if config.input.fallback_on_error => {
            tracing::warn!("Failed to load dataset ({err}), using fallback data");
            Ok(fallback_records())
        }
        Err(err) => Err(err.into()),
    }
}

/// Parses an hectare count that may be grouped with commas ("12,000").
fn parse_area(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

fn pad_code(code: &str, width: usize) -> String {
    format!("{code:0>width$}")
}

/// Five hardcoded rows kept in sync with the dashboard's published totals:
/// 5 municipalities, 4 distinct categories, 49,000 ha.
pub fn fallback_records() -> Vec<Record> {
    let rows = [
        ("44001", "Riohacha", SuitabilityCategory::High, 15000.0),
        ("44002", "Maicao", SuitabilityCategory::Medium, 12000.0),
        ("44003", "Uribia", SuitabilityCategory::Low, 8000.0),
        ("44004", "Manaure", SuitabilityCategory::NotSuitable, 5000.0),
        ("44005", "Albania", SuitabilityCategory::Medium, 9000.0),
    ];
    rows.iter()
        .map(|(code, name, category, area_ha)| Record {
            municipality_code: (*code).to_string(),
            department_code: "44".to_string(),
            municipality_name: (*name).to_string(),
            category: *category,
            area_ha: *area_ha,
        })
        .collect()
}
