use chrono::NaiveDateTime;
use serde::Serialize;

use super::entities::catalog_item;
use super::import::{CatalogRow, parse_catalog_csv};
use super::repository::{CatalogRepository, UpsertOutcome};
use crate::shared::error::AppResult;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

pub struct CatalogService;

impl CatalogService {
    /// Parses the file, then upserts row by row. A failing row aborts the
    /// import; rows before it stay committed.
    pub async fn import(
        repo: &dyn CatalogRepository,
        bytes: &[u8],
        now: NaiveDateTime,
    ) -> AppResult<ImportSummary> {
        let parsed = parse_catalog_csv(bytes)?;
        let mut summary = ImportSummary {
            skipped: parsed.skipped,
            ..Default::default()
        };

        for row in parsed.rows {
            match repo.upsert_by_url(Self::to_model(row, now)).await? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
            }
        }

        tracing::info!(
            "Catalog import finished: {} inserted, {} updated, {} skipped",
            summary.inserted,
            summary.updated,
            summary.skipped
        );
        Ok(summary)
    }

    fn to_model(row: CatalogRow, now: NaiveDateTime) -> catalog_item::Model {
        catalog_item::Model {
            id: 0,
            company: row.company,
            postal_code: row.postal_code,
            address: row.address,
            phone: row.phone,
            fax: row.fax,
            url: row.url,
            category: row.category,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::infra::persistence::InMemoryCatalogRepository;
    use chrono::Utc;

    #[tokio::test]
    async fn test_reimport_updates_by_url() {
        let repo = InMemoryCatalogRepository::new();
        let now = Utc::now().naive_utc();

        let first = "会社名,住所,URL,業種\n\
                     A社,東京都渋谷区,https://a.example.jp,カフェ\n";
        let summary = CatalogService::import(&repo, first.as_bytes(), now)
            .await
            .unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 1,
                updated: 0,
                skipped: 0
            }
        );

        let second = "会社名,住所,URL,業種\n\
                      A社(移転),大阪府大阪市,https://a.example.jp,カフェ\n\
                      B社,東京都港区,https://b.example.jp,カフェ\n";
        let summary = CatalogService::import(&repo, second.as_bytes(), now)
            .await
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 1);

        let all = repo.list(None, 100, 0).await.unwrap();
        assert_eq!(all.len(), 2);

        let a = repo
            .find_by_url("https://a.example.jp")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.company, "A社(移転)");
        assert_eq!(a.address, "大阪府大阪市");
        assert_eq!(a.id, 1);
    }

    #[tokio::test]
    async fn test_headerless_file_is_rejected() {
        let repo = InMemoryCatalogRepository::new();
        let result =
            CatalogService::import(&repo, b"x,y\n1,2\n", Utc::now().naive_utc()).await;
        assert!(matches!(
            result,
            Err(crate::shared::error::AppError::Validation(_))
        ));
    }
}
