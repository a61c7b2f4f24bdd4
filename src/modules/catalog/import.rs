//! Catalog CSV parsing.
//!
//! Files come from listing exports, either UTF-8 or Shift_JIS, often with a
//! few title/preamble lines before the real header row. Headers may be in
//! Japanese or English.

use encoding_rs::SHIFT_JIS;
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

use crate::shared::error::AppError;

#[derive(Debug, Error)]
pub enum CatalogImportError {
    #[error("no header row containing a company, URL or category column was found")]
    HeaderNotFound,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl From<CatalogImportError> for AppError {
    fn from(err: CatalogImportError) -> Self {
        AppError::validation("file", err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Company,
    PostalCode,
    Address,
    Prefecture,
    City,
    Street,
    Phone,
    Fax,
    Url,
    Category,
}

impl Field {
    fn is_required_marker(self) -> bool {
        matches!(self, Field::Company | Field::Url | Field::Category)
    }
}

const LABELS: &[(&str, Field)] = &[
    ("会社名", Field::Company),
    ("企業名", Field::Company),
    ("company", Field::Company),
    ("company_name", Field::Company),
    ("郵便番号", Field::PostalCode),
    ("postal_code", Field::PostalCode),
    ("zip", Field::PostalCode),
    ("住所", Field::Address),
    ("address", Field::Address),
    ("都道府県", Field::Prefecture),
    ("prefecture", Field::Prefecture),
    ("市区町村", Field::City),
    ("city", Field::City),
    ("番地", Field::Street),
    ("町域・番地", Field::Street),
    ("street", Field::Street),
    ("電話番号", Field::Phone),
    ("tel", Field::Phone),
    ("phone", Field::Phone),
    ("fax番号", Field::Fax),
    ("fax", Field::Fax),
    ("url", Field::Url),
    ("業種", Field::Category),
    ("カテゴリ", Field::Category),
    ("category", Field::Category),
];

fn lookup(label: &str) -> Option<Field> {
    let label = label.trim().to_ascii_lowercase();
    LABELS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, field)| *field)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    pub company: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
    pub fax: String,
    pub url: String,
    pub category: String,
}

#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub rows: Vec<CatalogRow>,
    /// Data rows dropped because they had no URL
    pub skipped: usize,
}

/// UTF-8 (with or without BOM) when valid, Shift_JIS otherwise.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
            if had_errors {
                tracing::warn!("Catalog file is neither valid UTF-8 nor Shift_JIS; decoded lossily");
            }
            text
        }
    }
}

pub fn parse_catalog_csv(bytes: &[u8]) -> Result<ParsedCatalog, CatalogImportError> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut columns: Option<HashMap<Field, usize>> = None;
    let mut parsed = ParsedCatalog::default();

    for record in reader.records() {
        let record = record?;

        let Some(columns) = columns.as_ref() else {
            let mapped: HashMap<Field, usize> = record
                .iter()
                .enumerate()
                .filter_map(|(idx, label)| lookup(label).map(|field| (field, idx)))
                .fold(HashMap::new(), |mut acc, (field, idx)| {
                    // first occurrence of a label wins
                    acc.entry(field).or_insert(idx);
                    acc
                });
            if mapped.keys().any(|f| f.is_required_marker()) {
                columns = Some(mapped);
            }
            continue;
        };

        let cell = |field: Field| -> String {
            columns
                .get(&field)
                .and_then(|&idx| record.get(idx))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let url = cell(Field::Url);
        if url.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        let address = if columns.contains_key(&Field::Address) {
            cell(Field::Address)
        } else {
            [Field::Prefecture, Field::City, Field::Street]
                .into_iter()
                .map(cell)
                .collect::<String>()
        };

        parsed.rows.push(CatalogRow {
            company: cell(Field::Company),
            postal_code: cell(Field::PostalCode),
            address,
            phone: cell(Field::Phone),
            fax: cell(Field::Fax),
            url,
            category: cell(Field::Category),
        });
    }

    if columns.is_none() {
        return Err(CatalogImportError::HeaderNotFound);
    }

    Ok(parsed)
}
