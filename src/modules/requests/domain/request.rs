use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::modules::matching::Selection;
use crate::modules::requests::entities::{enums::RequestCategory, request};
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum CompleteState {
    Pending,
    Requested,
    Fulfilled,
}

impl From<CompleteState> for i32 {
    fn from(state: CompleteState) -> Self {
        match state {
            CompleteState::Pending => 0,
            CompleteState::Requested => 1,
            CompleteState::Fulfilled => 2,
        }
    }
}

impl TryFrom<i32> for CompleteState {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompleteState::Pending),
            1 => Ok(CompleteState::Requested),
            2 => Ok(CompleteState::Fulfilled),
            other => Err(format!("completeState must be 0, 1 or 2, got {}", other)),
        }
    }
}

/// Per-category payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestDetail {
    Green,
    Blue {
        tags: Option<String>,
        detail_condition: Option<String>,
    },
    Yellow {
        portal_site: Option<String>,
    },
    Pink,
    Red {
        work_selection: Selection,
    },
}

impl RequestDetail {
    pub fn category(&self) -> RequestCategory {
        match self {
            RequestDetail::Green => RequestCategory::Green,
            RequestDetail::Blue { .. } => RequestCategory::Blue,
            RequestDetail::Yellow { .. } => RequestCategory::Yellow,
            RequestDetail::Pink => RequestCategory::Pink,
            RequestDetail::Red { .. } => RequestCategory::Red,
        }
    }

    pub fn work_selection(&self) -> Option<&Selection> {
        match self {
            RequestDetail::Red { work_selection } => Some(work_selection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub file_path: String,
    pub file_name: String,
    pub row_count: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub project_name: String,
    pub wish_num: i32,
    pub area_selection: Selection,
    pub area_memo: Option<String>,
    pub detail: RequestDetail,
    pub complete_state: Option<CompleteState>,
}

/// Partial update. Variant fields that do not apply to the request's
/// category are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestChanges {
    pub project_name: Option<String>,
    pub wish_num: Option<i32>,
    pub area_selection: Option<Selection>,
    pub work_selection: Option<Selection>,
    pub area_memo: Option<String>,
    pub tags: Option<String>,
    pub detail_condition: Option<String>,
    pub portal_site: Option<String>,
    pub complete_state: Option<CompleteState>,
    pub request_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDomain {
    pub id: i32,
    pub request_id: String,
    pub user_id: i32,
    pub project_name: String,
    pub wish_num: i32,
    pub area_selection: Selection,
    pub area_memo: Option<String>,
    pub detail: RequestDetail,
    pub complete_state: CompleteState,
    pub cancelled: bool,
    pub list_count: Option<i32>,
    pub delivered_file: Option<DeliveredFile>,
    pub created_at: NaiveDateTime,
    pub request_at: Option<NaiveDateTime>,
    pub delivery_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl RequestDomain {
    /// Starts Pending unless the caller asks otherwise; asking for
    /// Requested stamps `request_at`.
    pub fn create(user_id: i32, new: NewRequest, request_id: String, now: NaiveDateTime) -> Self {
        let complete_state = new.complete_state.unwrap_or(CompleteState::Pending);
        let request_at = (complete_state == CompleteState::Requested).then_some(now);

        Self {
            id: 0,
            request_id,
            user_id,
            project_name: new.project_name,
            wish_num: new.wish_num,
            area_selection: new.area_selection,
            area_memo: new.area_memo,
            detail: new.detail,
            complete_state,
            cancelled: false,
            list_count: None,
            delivered_file: None,
            created_at: now,
            request_at,
            delivery_at: None,
            updated_at: now,
        }
    }

    pub fn category(&self) -> RequestCategory {
        self.detail.category()
    }

    pub fn work_selection(&self) -> Option<&Selection> {
        self.detail.work_selection()
    }

    pub fn apply_update(&mut self, changes: RequestChanges, now: NaiveDateTime) {
        if let Some(name) = changes.project_name {
            self.project_name = name;
        }
        if let Some(wish_num) = changes.wish_num {
            self.wish_num = wish_num;
        }
        if let Some(area) = changes.area_selection {
            self.area_selection = area;
        }
        if let Some(memo) = changes.area_memo {
            self.area_memo = Some(memo);
        }

        match &mut self.detail {
            RequestDetail::Blue {
                tags,
                detail_condition,
            } => {
                if changes.tags.is_some() {
                    *tags = changes.tags;
                }
                if changes.detail_condition.is_some() {
                    *detail_condition = changes.detail_condition;
                }
            }
            RequestDetail::Yellow { portal_site } => {
                if changes.portal_site.is_some() {
                    *portal_site = changes.portal_site;
                }
            }
            RequestDetail::Red { work_selection } => {
                if let Some(work) = changes.work_selection {
                    *work_selection = work;
                }
            }
            RequestDetail::Green | RequestDetail::Pink => {}
        }

        if let Some(request_at) = changes.request_at {
            self.request_at = Some(request_at);
        }
        if let Some(state) = changes.complete_state {
            self.complete_state = state;
            if state == CompleteState::Requested {
                self.request_at = Some(now);
            }
            if state != CompleteState::Pending {
                self.cancelled = false;
            }
        }

        self.updated_at = now;
    }

    pub fn deliver(&mut self, file: DeliveredFile, now: NaiveDateTime) {
        self.complete_state = CompleteState::Fulfilled;
        self.cancelled = false;
        self.delivered_file = Some(file);
        self.delivery_at = Some(now);
        self.updated_at = now;
    }

    /// Allowed from every state, Fulfilled included.
    pub fn cancel(&mut self, now: NaiveDateTime) {
        self.cancelled = true;
        self.complete_state = CompleteState::Pending;
        self.request_at = None;
        self.updated_at = now;
    }

    pub fn into_model(self) -> request::Model {
        let category = self.category();
        let (work_selection, tags, detail_condition, portal_site) = match self.detail {
            RequestDetail::Red { work_selection } => (Some(work_selection.to_stored()), None, None, None),
            RequestDetail::Blue {
                tags,
                detail_condition,
            } => (None, tags, detail_condition, None),
            RequestDetail::Yellow { portal_site } => (None, None, None, portal_site),
            RequestDetail::Green | RequestDetail::Pink => (None, None, None, None),
        };
        let (file_path, file_name, row_count) = match self.delivered_file {
            Some(file) => (Some(file.file_path), Some(file.file_name), Some(file.row_count)),
            None => (None, None, None),
        };

        request::Model {
            id: self.id,
            request_id: self.request_id,
            user_id: self.user_id,
            category,
            project_name: self.project_name,
            wish_num: self.wish_num,
            area_selection: self.area_selection.to_stored(),
            work_selection,
            area_memo: self.area_memo,
            tags,
            detail_condition,
            portal_site,
            complete_state: self.complete_state.into(),
            cancel_state: i32::from(self.cancelled),
            list_count: self.list_count,
            file_path,
            file_name,
            row_count,
            created_at: self.created_at,
            request_at: self.request_at,
            delivery_at: self.delivery_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<request::Model> for RequestDomain {
    type Error = AppError;

    fn try_from(model: request::Model) -> Result<Self, Self::Error> {
        let area_selection = Selection::from_stored(&model.area_selection)?;
        let detail = match model.category {
            RequestCategory::Green => RequestDetail::Green,
            RequestCategory::Blue => RequestDetail::Blue {
                tags: model.tags,
                detail_condition: model.detail_condition,
            },
            RequestCategory::Yellow => RequestDetail::Yellow {
                portal_site: model.portal_site,
            },
            RequestCategory::Pink => RequestDetail::Pink,
            RequestCategory::Red => RequestDetail::Red {
                work_selection: match &model.work_selection {
                    Some(value) => Selection::from_stored(value)?,
                    None => Selection::default(),
                },
            },
        };
        let complete_state = CompleteState::try_from(model.complete_state).map_err(|e| {
            AppError::InternalServerError(format!("request {}: {}", model.request_id, e))
        })?;
        let delivered_file = match (model.file_path, model.file_name) {
            (Some(file_path), Some(file_name)) => Some(DeliveredFile {
                file_path,
                file_name,
                row_count: model.row_count.unwrap_or(0),
            }),
            _ => None,
        };

        Ok(Self {
            id: model.id,
            request_id: model.request_id,
            user_id: model.user_id,
            project_name: model.project_name,
            wish_num: model.wish_num,
            area_selection,
            area_memo: model.area_memo,
            detail,
            complete_state,
            cancelled: model.cancel_state != 0,
            list_count: model.list_count,
            delivered_file,
            created_at: model.created_at,
            request_at: model.request_at,
            delivery_at: model.delivery_at,
            updated_at: model.updated_at,
        })
    }
}
