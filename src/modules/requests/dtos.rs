use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::request::{
    CompleteState, DeliveredFile, NewRequest, RequestChanges, RequestDetail, RequestDomain,
};
use super::entities::enums::RequestCategory;
use crate::modules::matching::{MatchResult, Selection};
use crate::shared::error::{AppError, AppResult, FieldError};

// Selections arrive as raw JSON so that a wrong shape is reported as
// MalformedSelection rather than as a body rejection.

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequestDto {
    pub project_name: String,
    pub wish_num: i32,
    pub area_selection: Option<Value>,
    pub work_selection: Option<Value>,
    pub area_memo: Option<String>,
    pub tags: Option<String>,
    pub detail_condition: Option<String>,
    pub portal_site: Option<String>,
    pub complete_state: Option<i32>,
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn complete_state(raw: Option<i32>, errors: &mut Vec<FieldError>) -> Option<CompleteState> {
    let raw = raw?;
    match CompleteState::try_from(raw) {
        Ok(state) => Some(state),
        Err(message) => {
            errors.push(field_error("completeState", &message));
            None
        }
    }
}

impl CreateRequestDto {
    pub fn into_new_request(self, category: RequestCategory) -> AppResult<NewRequest> {
        let mut errors = Vec::new();
        if self.project_name.trim().is_empty() {
            errors.push(field_error("projectName", "projectName is required."));
        }
        if self.wish_num < 0 {
            errors.push(field_error("wishNum", "wishNum must not be negative."));
        }
        if self.area_selection.is_none() {
            errors.push(field_error("areaSelection", "areaSelection is required."));
        }
        if category == RequestCategory::Red && self.work_selection.is_none() {
            errors.push(field_error(
                "workSelection",
                "workSelection is required for red requests.",
            ));
        }
        let state = complete_state(self.complete_state, &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let area_selection = match &self.area_selection {
            Some(value) => Selection::from_value(value)?,
            None => Selection::default(),
        };
        let detail = match category {
            RequestCategory::Green => RequestDetail::Green,
            RequestCategory::Blue => RequestDetail::Blue {
                tags: self.tags,
                detail_condition: self.detail_condition,
            },
            RequestCategory::Yellow => RequestDetail::Yellow {
                portal_site: self.portal_site,
            },
            RequestCategory::Pink => RequestDetail::Pink,
            RequestCategory::Red => RequestDetail::Red {
                work_selection: match &self.work_selection {
                    Some(value) => Selection::from_value(value)?,
                    None => Selection::default(),
                },
            },
        };

        Ok(NewRequest {
            project_name: self.project_name.trim().to_string(),
            wish_num: self.wish_num,
            area_selection,
            area_memo: self.area_memo,
            detail,
            complete_state: state,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequestDto {
    pub project_name: Option<String>,
    pub wish_num: Option<i32>,
    pub area_selection: Option<Value>,
    pub work_selection: Option<Value>,
    pub area_memo: Option<String>,
    pub tags: Option<String>,
    pub detail_condition: Option<String>,
    pub portal_site: Option<String>,
    pub complete_state: Option<i32>,
    pub request_at: Option<NaiveDateTime>,
}

impl UpdateRequestDto {
    pub fn into_changes(self) -> AppResult<RequestChanges> {
        let mut errors = Vec::new();
        if matches!(&self.project_name, Some(name) if name.trim().is_empty()) {
            errors.push(field_error("projectName", "projectName must not be empty."));
        }
        if matches!(self.wish_num, Some(n) if n < 0) {
            errors.push(field_error("wishNum", "wishNum must not be negative."));
        }
        let state = complete_state(self.complete_state, &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(RequestChanges {
            project_name: self.project_name.map(|name| name.trim().to_string()),
            wish_num: self.wish_num,
            area_selection: self
                .area_selection
                .as_ref()
                .map(Selection::from_value)
                .transpose()?,
            work_selection: self
                .work_selection
                .as_ref()
                .map(Selection::from_value)
                .transpose()?,
            area_memo: self.area_memo,
            tags: self.tags,
            detail_condition: self.detail_condition,
            portal_site: self.portal_site,
            complete_state: state,
            request_at: self.request_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverDto {
    pub file_path: String,
    pub file_name: String,
    pub row_count: i32,
}

impl DeliverDto {
    pub fn into_file(self) -> AppResult<DeliveredFile> {
        let mut errors = Vec::new();
        if self.file_path.trim().is_empty() {
            errors.push(field_error("filePath", "filePath is required."));
        }
        if self.file_name.trim().is_empty() {
            errors.push(field_error("fileName", "fileName is required."));
        }
        if self.row_count < 0 {
            errors.push(field_error("rowCount", "rowCount must not be negative."));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(DeliveredFile {
            file_path: self.file_path,
            file_name: self.file_name,
            row_count: self.row_count,
        })
    }
}

/// A request as returned to clients. For red requests `completeState` and
/// `listCount` reflect the catalog at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: i32,
    pub request_id: String,
    pub user_id: i32,
    pub category: RequestCategory,
    pub project_name: String,
    pub wish_num: i32,
    pub area_selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_selection: Option<Selection>,
    pub area_memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_site: Option<String>,
    pub complete_state: CompleteState,
    pub cancel_state: i32,
    pub list_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<usize>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub row_count: Option<i32>,
    pub created_at: NaiveDateTime,
    pub request_at: Option<NaiveDateTime>,
    pub delivery_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl RequestView {
    pub fn from_domain(request: RequestDomain, matched_count: Option<usize>) -> Self {
        let category = request.category();
        let (work_selection, tags, detail_condition, portal_site) = match request.detail {
            RequestDetail::Red { work_selection } => (Some(work_selection), None, None, None),
            RequestDetail::Blue {
                tags,
                detail_condition,
            } => (None, tags, detail_condition, None),
            RequestDetail::Yellow { portal_site } => (None, None, None, portal_site),
            RequestDetail::Green | RequestDetail::Pink => (None, None, None, None),
        };
        let (file_path, file_name, row_count) = match request.delivered_file {
            Some(file) => (Some(file.file_path), Some(file.file_name), Some(file.row_count)),
            None => (None, None, None),
        };

        Self {
            id: request.id,
            request_id: request.request_id,
            user_id: request.user_id,
            category,
            project_name: request.project_name,
            wish_num: request.wish_num,
            area_selection: request.area_selection,
            work_selection,
            area_memo: request.area_memo,
            tags,
            detail_condition,
            portal_site,
            complete_state: request.complete_state,
            cancel_state: i32::from(request.cancelled),
            list_count: request.list_count,
            matched_count,
            file_path,
            file_name,
            row_count,
            created_at: request.created_at,
            request_at: request.request_at,
            delivery_at: request.delivery_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesView {
    pub request_id: String,
    pub matched_count: usize,
    pub results: Vec<MatchResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
}
