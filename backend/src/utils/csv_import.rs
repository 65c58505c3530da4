//! Parses roster CSV uploads. The file must carry a header row; `member_id`
//! and `name` are required per row, everything else is optional. Rows that
//! fail to parse are reported individually instead of aborting the import.

use serde::Deserialize;

use crate::models::member::MembershipType;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One parsed roster row.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    pub member_id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub membership_type: Option<String>,
    #[serde(default)]
    pub joined_on: Option<String>,
}

impl ImportRow {
    pub fn membership_type(&self) -> MembershipType {
        self.membership_type
            .as_deref()
            .and_then(MembershipType::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub row_errors: Vec<String>,
}

const REQUIRED_COLUMNS: [&str; 2] = ["member_id", "name"];

pub fn parse_roster_csv(bytes: &[u8]) -> Result<ParsedImport, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(ImportError::MissingColumn(required));
        }
    }

    let mut parsed = ParsedImport::default();
    for (idx, record) in reader.deserialize::<ImportRow>().enumerate() {
        // Header row is line 1
        let line = idx + 2;
        match record {
            Ok(row) if row.member_id.is_empty() => {
                parsed.row_errors.push(format!("line {}: empty member_id", line));
            }
            Ok(row) if row.name.is_empty() => {
                parsed.row_errors.push(format!("line {}: empty name", line));
            }
            Ok(mut row) => {
                normalize_row(&mut row);
                parsed.rows.push(row);
            }
            Err(e) => parsed.row_errors.push(format!("line {}: {}", line, e)),
        }
    }

    Ok(parsed)
}

fn normalize_row(row: &mut ImportRow) {
    for field in [
        &mut row.date_of_birth,
        &mut row.address,
        &mut row.blood_group,
        &mut row.phone,
        &mut row.image_url,
        &mut row.membership_type,
        &mut row.joined_on,
    ] {
        if field.as_deref().is_some_and(str::is_empty) {
            *field = None;
        }
    }
}
