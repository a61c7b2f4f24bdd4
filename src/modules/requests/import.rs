use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use super::dtos::CreateRequestDto;
use crate::modules::catalog::import::decode;
use crate::shared::error::{AppError, AppResult, FieldError};

/// One CSV line. Selection columns hold JSON objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestCsvRow {
    project_name: String,
    wish_num: Option<i32>,
    area_selection: Option<String>,
    work_selection: Option<String>,
    area_memo: Option<String>,
    tags: Option<String>,
    detail_condition: Option<String>,
    portal_site: Option<String>,
    complete_state: Option<i32>,
}

fn json_column(raw: Option<String>, column: &str) -> Result<Option<serde_json::Value>, String> {
    match raw.filter(|s| !s.is_empty()) {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| format!("{} is not valid JSON: {}", column, e)),
        None => Ok(None),
    }
}

impl RequestCsvRow {
    fn into_dto(self) -> Result<CreateRequestDto, String> {
        Ok(CreateRequestDto {
            project_name: self.project_name,
            wish_num: self.wish_num.unwrap_or(0),
            area_selection: json_column(self.area_selection, "areaSelection")?,
            work_selection: json_column(self.work_selection, "workSelection")?,
            area_memo: self.area_memo,
            tags: self.tags,
            detail_condition: self.detail_condition,
            portal_site: self.portal_site,
            complete_state: self.complete_state,
        })
    }
}

/// Prefixes field-level detail with the CSV line it came from. Line 1 is
/// the header.
pub fn at_line(err: AppError, line: usize) -> AppError {
    match err {
        AppError::Validation(errors) => AppError::Validation(
            errors
                .into_iter()
                .map(|e| FieldError {
                    field: format!("line {}: {}", line, e.field),
                    message: e.message,
                })
                .collect(),
        ),
        AppError::MalformedSelection(message) => {
            AppError::MalformedSelection(format!("line {}: {}", line, message))
        }
        other => other,
    }
}

pub fn parse_request_csv(bytes: &[u8]) -> AppResult<Vec<CreateRequestDto>> {
    let text = decode(bytes);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<RequestCsvRow>().enumerate() {
        let line = index + 2;
        let row = record
            .map_err(|e| AppError::validation("file", format!("line {}: {}", line, e)))?;
        let dto = row
            .into_dto()
            .map_err(|message| at_line(AppError::MalformedSelection(message), line))?;
        rows.push(dto);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_json_columns_and_optional_fields() {
        let csv = "projectName,wishNum,areaSelection,workSelection,completeState\n\
                   渋谷IT,30,\"{\"\"関東\"\": [\"\"東京都渋谷区\"\"]}\",\"{\"\"IT\"\": [\"\"IT・情報通信\"\"]}\",1\n\
                   大阪飲食,,\"{}\",,\n";

        let rows = parse_request_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project_name, "渋谷IT");
        assert_eq!(rows[0].wish_num, 30);
        assert_eq!(rows[0].area_selection, Some(json!({"関東": ["東京都渋谷区"]})));
        assert_eq!(rows[0].complete_state, Some(1));
        assert_eq!(rows[1].wish_num, 0);
        assert_eq!(rows[1].work_selection, None);
    }

    #[test]
    fn test_invalid_json_names_the_line() {
        let csv = "projectName,areaSelection\nok,\"{}\"\nbroken,{not json\n";

        match parse_request_csv(csv.as_bytes()) {
            Err(AppError::MalformedSelection(message)) => assert!(message.starts_with("line 3:")),
            other => panic!("expected malformed selection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "wishNum\n10\n";
        assert!(matches!(
            parse_request_csv(csv.as_bytes()),
            Err(AppError::Validation(_))
        ));
    }
}
