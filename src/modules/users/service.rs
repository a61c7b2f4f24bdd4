use chrono::NaiveDateTime;

use super::dtos::UpdateUserDto;
use super::entities::user;
use super::repository::UserRepository;
use super::utils::hash_password;
use crate::modules::clients::repository::ClientRepository;
use crate::shared::error::{AppError, AppResult};

pub struct UserService;

impl UserService {
    pub async fn get(repo: &dyn UserRepository, id: i32) -> AppResult<user::Model> {
        repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list(repo: &dyn UserRepository) -> AppResult<Vec<user::Model>> {
        repo.find_all().await
    }

    pub async fn update(
        repo: &dyn UserRepository,
        clients: &dyn ClientRepository,
        id: i32,
        dto: UpdateUserDto,
        now: NaiveDateTime,
    ) -> AppResult<user::Model> {
        let mut user = Self::get(repo, id).await?;

        if let Some(name) = dto.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("name", "Name must not be empty."));
            }
            user.name = name.to_string();
        }
        if let Some(role) = dto.role {
            if role < 0 {
                return Err(AppError::validation("role", "Role must be 0 or greater."));
            }
            user.role = role;
        }
        if let Some(contract_id) = dto.contract_id {
            Self::ensure_contract_exists(clients, &contract_id).await?;
            user.contract_id = Some(contract_id);
        }

        user.updated_at = now;
        repo.update(user).await
    }

    pub async fn delete(repo: &dyn UserRepository, id: i32) -> AppResult<()> {
        if !repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Creates the startup manager account unless the e-mail is already
    /// registered. An existing account keeps its role and password.
    pub async fn ensure_manager(
        repo: &dyn UserRepository,
        name: &str,
        email: &str,
        password: &str,
        now: NaiveDateTime,
    ) -> AppResult<Option<user::Model>> {
        if repo.find_by_email(email).await?.is_some() {
            tracing::debug!("Manager {} already present, skipping seed", email);
            return Ok(None);
        }

        let manager = repo
            .insert(user::Model {
                id: 0,
                name: name.to_string(),
                email: email.to_string(),
                password: hash_password(password).await?,
                role: user::ROLE_MANAGER,
                contract_id: None,
                password_reset_token: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!("Seeded manager account {}", manager.email);
        Ok(Some(manager))
    }

    pub async fn ensure_contract_exists(
        clients: &dyn ClientRepository,
        contract_id: &str,
    ) -> AppResult<()> {
        match clients.find_by_contract_id(contract_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::validation(
                "contractId",
                "No client has this contract ID.",
            )),
        }
    }
}
