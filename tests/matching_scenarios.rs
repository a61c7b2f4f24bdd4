use chrono::{NaiveDate, NaiveDateTime};
use doctrack_backend::modules::catalog::entities::catalog_item;
use doctrack_backend::modules::matching::export::{export_rows, write_csv};
use doctrack_backend::modules::matching::{MatchState, Selection, evaluate};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn ts(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn selection(value: Value) -> Selection {
    Selection::from_value(&value).unwrap()
}

fn item(id: i32, category: &str, address: &str) -> catalog_item::Model {
    catalog_item::Model {
        id,
        company: format!("会社{}", id),
        postal_code: String::new(),
        address: address.to_string(),
        phone: String::new(),
        fax: String::new(),
        url: format!("https://example.com/{}", id),
        category: category.to_string(),
        created_at: ts(1),
        updated_at: ts(id as u32 + 1),
    }
}

#[test]
fn shibuya_item_registers_the_pair() {
    let area = selection(json!({"region1": ["東京都渋谷区"]}));
    let work = selection(json!({"catA": ["IT・情報通信"]}));
    let catalog = vec![item(1, "IT・情報通信", "東京都渋谷区1-2-3")];

    let evaluation = evaluate(&area, &work, &catalog, ts(20));

    assert_eq!(evaluation.results.len(), 1);
    assert_eq!(evaluation.results[0].state, MatchState::Registered);
    assert_eq!(evaluation.results[0].date, ts(2));
    assert_eq!(evaluation.matched_count, 1);
}

#[test]
fn osaka_item_leaves_the_pair_unregistered() {
    let area = selection(json!({"region1": ["東京都渋谷区"]}));
    let work = selection(json!({"catA": ["IT・情報通信"]}));
    let catalog = vec![item(1, "IT・情報通信", "大阪府大阪市")];

    let evaluation = evaluate(&area, &work, &catalog, ts(20));

    assert_eq!(evaluation.results[0].state, MatchState::Unregistered);
    assert_eq!(evaluation.results[0].date, ts(20));
    assert_eq!(evaluation.matched_count, 0);
    assert!(!evaluation.has_match());
}

#[test]
fn cross_product_has_m_times_n_entries_in_order() {
    let area = selection(json!({
        "関東": ["東京都", "神奈川県"],
        "関西": ["大阪府"],
    }));
    let work = selection(json!({
        "IT": ["IT・情報通信"],
        "飲食": ["居酒屋", "カフェ"],
    }));
    let catalog = vec![
        item(1, "カフェ", "神奈川県横浜市"),
        item(2, "IT・情報通信", "大阪府大阪市北区"),
    ];

    let evaluation = evaluate(&area, &work, &catalog, ts(20));
    let summary: Vec<(&str, &str, MatchState)> = evaluation
        .results
        .iter()
        .map(|r| (r.area.as_str(), r.small_category.as_str(), r.state))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("東京都", "IT・情報通信", MatchState::Unregistered),
            ("東京都", "居酒屋", MatchState::Unregistered),
            ("東京都", "カフェ", MatchState::Unregistered),
            ("神奈川県", "IT・情報通信", MatchState::Unregistered),
            ("神奈川県", "居酒屋", MatchState::Unregistered),
            ("神奈川県", "カフェ", MatchState::Registered),
            ("大阪府", "IT・情報通信", MatchState::Registered),
            ("大阪府", "居酒屋", MatchState::Unregistered),
            ("大阪府", "カフェ", MatchState::Unregistered),
        ]
    );
    assert_eq!(evaluation.matched_count, 2);
}

#[test]
fn malformed_selection_is_rejected_before_evaluation() {
    assert!(Selection::from_value(&json!({"region1": "東京都"})).is_err());
    assert!(Selection::from_value(&json!(["東京都"])).is_err());
    assert!(Selection::from_value(&json!({"region1": ["東京都", 3]})).is_err());
}

#[test]
fn export_csv_lists_each_matching_item_once() {
    let area = selection(json!({"a": ["東京都", "渋谷区"]}));
    let work = selection(json!({"w": ["IT・情報通信"]}));
    let catalog = vec![
        item(1, "IT・情報通信", "東京都渋谷区1-2-3"),
        item(2, "IT・情報通信", "東京都港区"),
    ];

    let rows = export_rows(&area, &work, &catalog);
    assert_eq!(rows.len(), 2);

    let bytes = write_csv(&rows).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    assert_eq!(
        lines.next(),
        Some("会社名,郵便番号,住所,電話番号,FAX番号,URL,業種")
    );
    assert_eq!(lines.count(), 2);
}
