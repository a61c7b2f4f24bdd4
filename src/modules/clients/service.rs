use chrono::NaiveDateTime;

use super::dtos::{CostDto, UpdateClientDto};
use super::entities::{client, client_cost};
use super::repository::ClientRepository;
use crate::shared::error::{AppError, AppResult, FieldError};
use crate::shared::identifier::with_identifier_retry;
use crate::shared::repository::RepositoryManager;

pub struct ClientService;

impl ClientService {
    pub async fn list(repo: &dyn ClientRepository) -> AppResult<Vec<client::Model>> {
        repo.find_all().await
    }

    /// Creates the client and its all-zero cost row atomically. The contract
    /// ID comes from `next_id` and is regenerated once on collision.
    pub async fn add_client(
        manager: &dyn RepositoryManager,
        repo: &dyn ClientRepository,
        name: &str,
        now: NaiveDateTime,
        next_id: impl FnMut() -> String,
    ) -> AppResult<client::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Name is required."));
        }

        let client = with_identifier_retry(next_id, |contract_id| {
            Self::insert_with_cost(manager, repo, name, contract_id, now)
        })
        .await?;

        tracing::info!("Created client {} ({})", client.id, client.contract_id);
        Ok(client)
    }

    async fn insert_with_cost(
        manager: &dyn RepositoryManager,
        repo: &dyn ClientRepository,
        name: &str,
        contract_id: String,
        now: NaiveDateTime,
    ) -> AppResult<client::Model> {
        let uow = manager.begin().await?;
        let tx_repo = repo.with_transaction(uow.as_ref()).ok_or_else(|| {
            AppError::InternalServerError("ClientRepository cannot join transaction".to_string())
        })?;

        let result: AppResult<client::Model> = async {
            let client = tx_repo
                .insert(client::Model {
                    id: 0,
                    name: name.to_string(),
                    contract_id,
                    memo: None,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            tx_repo
                .upsert_cost(client_cost::Model::zero(client.id, now))
                .await?;
            Ok(client)
        }
        .await;

        match result {
            Ok(client) => {
                uow.commit().await?;
                Ok(client)
            }
            Err(err) => {
                uow.rollback().await?;
                Err(err)
            }
        }
    }

    pub async fn update(
        repo: &dyn ClientRepository,
        id: i32,
        dto: UpdateClientDto,
        now: NaiveDateTime,
    ) -> AppResult<client::Model> {
        let mut client = repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;

        if let Some(name) = dto.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("name", "Name must not be empty."));
            }
            client.name = name.to_string();
        }
        if let Some(memo) = dto.memo {
            client.memo = Some(memo);
        }

        client.updated_at = now;
        repo.update(client).await
    }

    /// A client without a stored row is billed nothing.
    pub async fn get_cost(
        repo: &dyn ClientRepository,
        client_id: i32,
        now: NaiveDateTime,
    ) -> AppResult<client_cost::Model> {
        repo.find_by_id(client_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(repo
            .find_cost(client_id)
            .await?
            .unwrap_or_else(|| client_cost::Model::zero(client_id, now)))
    }

    pub async fn set_cost(
        repo: &dyn ClientRepository,
        client_id: i32,
        dto: CostDto,
        now: NaiveDateTime,
    ) -> AppResult<client_cost::Model> {
        let prices = [
            ("green", dto.green),
            ("blue", dto.blue),
            ("yellow", dto.yellow),
            ("pink", dto.pink),
            ("red", dto.red),
        ];
        let errors: Vec<FieldError> = prices
            .iter()
            .filter(|(_, price)| *price < 0)
            .map(|(field, _)| FieldError {
                field: field.to_string(),
                message: "Price must not be negative.".to_string(),
            })
            .collect();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        repo.find_by_id(client_id)
            .await?
            .ok_or(AppError::NotFound)?;

        repo.upsert_cost(client_cost::Model {
            id: 0,
            client_id,
            green: dto.green,
            blue: dto.blue,
            yellow: dto.yellow,
            pink: dto.pink,
            red: dto.red,
            updated_at: now,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::clients::infra::persistence::InMemoryClientRepository;
    use crate::shared::infra::repository::InMemoryRepositoryManager;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn ids(list: &[&str]) -> impl FnMut() -> String {
        let mut queue: Vec<String> = list.iter().rev().map(|s| s.to_string()).collect();
        move || queue.pop().unwrap_or_else(|| "zzzzz".to_string())
    }

    #[tokio::test]
    async fn test_add_client_creates_zero_cost_row() {
        let manager = InMemoryRepositoryManager::new();
        let repo = InMemoryClientRepository::new();

        let client = ClientService::add_client(&manager, &repo, " Acme ", now(), ids(&["ab12c"]))
            .await
            .unwrap();
        assert_eq!(client.name, "Acme");
        assert_eq!(client.contract_id, "ab12c");

        let cost = repo.find_cost(client.id).await.unwrap().unwrap();
        assert_eq!(cost, client_cost::Model { id: cost.id, ..client_cost::Model::zero(client.id, now()) });
    }

    #[tokio::test]
    async fn test_add_client_retries_contract_collision_once() {
        let manager = InMemoryRepositoryManager::new();
        let repo = InMemoryClientRepository::new();
        ClientService::add_client(&manager, &repo, "First", now(), ids(&["aaaaa"]))
            .await
            .unwrap();

        let second =
            ClientService::add_client(&manager, &repo, "Second", now(), ids(&["aaaaa", "bbbbb"]))
                .await
                .unwrap();
        assert_eq!(second.contract_id, "bbbbb");

        let err =
            ClientService::add_client(&manager, &repo, "Third", now(), ids(&["aaaaa", "bbbbb"]))
                .await
                .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier));
    }

    #[tokio::test]
    async fn test_set_cost_rejects_negative_prices() {
        let manager = InMemoryRepositoryManager::new();
        let repo = InMemoryClientRepository::new();
        let client = ClientService::add_client(&manager, &repo, "Acme", now(), ids(&["ab12c"]))
            .await
            .unwrap();

        let dto = CostDto {
            green: 10,
            blue: -1,
            yellow: 0,
            pink: 0,
            red: -5,
        };
        match ClientService::set_cost(&repo, client.id, dto, now()).await {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["blue", "red"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_cost_then_get_cost() {
        let manager = InMemoryRepositoryManager::new();
        let repo = InMemoryClientRepository::new();
        let client = ClientService::add_client(&manager, &repo, "Acme", now(), ids(&["ab12c"]))
            .await
            .unwrap();

        let dto = CostDto {
            green: 10,
            blue: 20,
            yellow: 30,
            pink: 40,
            red: 50,
        };
        ClientService::set_cost(&repo, client.id, dto, now())
            .await
            .unwrap();

        let cost = ClientService::get_cost(&repo, client.id, now()).await.unwrap();
        assert_eq!((cost.green, cost.red), (10, 50));
    }

    #[tokio::test]
    async fn test_cost_of_unknown_client_is_not_found() {
        let repo = InMemoryClientRepository::new();
        let err = ClientService::get_cost(&repo, 42, now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
