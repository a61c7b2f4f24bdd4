use serde::Serialize;

use super::engine::matching_items;
use super::selection::Selection;
use crate::modules::catalog::entities::catalog_item;

pub const EXPORT_HEADERS: [&str; 7] = [
    "会社名",
    "郵便番号",
    "住所",
    "電話番号",
    "FAX番号",
    "URL",
    "業種",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "会社名")]
    pub company: String,
    #[serde(rename = "郵便番号")]
    pub postal_code: String,
    #[serde(rename = "住所")]
    pub address: String,
    #[serde(rename = "電話番号")]
    pub phone: String,
    #[serde(rename = "FAX番号")]
    pub fax: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "業種")]
    pub category: String,
}

impl From<&catalog_item::Model> for ExportRow {
    fn from(item: &catalog_item::Model) -> Self {
        Self {
            company: item.company.clone(),
            postal_code: item.postal_code.clone(),
            address: item.address.clone(),
            phone: item.phone.clone(),
            fax: item.fax.clone(),
            url: item.url.clone(),
            category: item.category.clone(),
        }
    }
}

pub fn export_rows(
    area_selection: &Selection,
    work_selection: &Selection,
    catalog: &[catalog_item::Model],
) -> Vec<ExportRow> {
    matching_items(area_selection, work_selection, catalog)
        .into_iter()
        .map(ExportRow::from)
        .collect()
}

/// UTF-8 CSV with a BOM (spreadsheet tools otherwise guess Shift_JIS) and a
/// header row even when there are no rows.
pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        writer.write_record(EXPORT_HEADERS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}
