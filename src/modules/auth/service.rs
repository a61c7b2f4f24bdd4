use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::dtos::{ResetPasswordDto, SigninDto, SignupDto};
use super::providers::email::EmailProvider;
use crate::modules::clients::repository::ClientRepository;
use crate::modules::users::entities::user::{self, ROLE_REGULAR};
use crate::modules::users::repository::UserRepository;
use crate::modules::users::service::UserService;
use crate::modules::users::utils::{hash_password, verify_password};
use crate::shared::config::Config;
use crate::shared::error::{AppError, AppResult, FieldError};

const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const INVALID_RESET_TOKEN: &str = "Invalid or expired token.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: i32,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn is_manager(&self) -> bool {
        self.role != ROLE_REGULAR
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    id: i32,
    iat: usize,
    exp: usize,
}

pub struct AuthService;

impl AuthService {
    pub fn issue_token(config: &Config, user: &user::Model, now: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            id: user.id,
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + Duration::minutes(config.jwt_ttl_minutes)).timestamp() as usize,
        };
        Self::sign(config, &claims)
    }

    pub fn verify_token(config: &Config, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
        })
    }

    fn sign<T: Serialize>(config: &Config, claims: &T) -> AppResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalServerError(format!("JWT generation failed: {}", e)))
    }

    /// Registers a regular user and returns a session token.
    pub async fn signup(
        users: &dyn UserRepository,
        clients: &dyn ClientRepository,
        config: &Config,
        dto: SignupDto,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("name", &dto.name),
            ("email", &dto.email),
            ("password", &dto.password),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field: field.to_string(),
                    message: format!("{} is required.", field),
                });
            }
        }
        if !dto.email.trim().is_empty() && !dto.email.contains('@') {
            errors.push(FieldError {
                field: "email".to_string(),
                message: "Invalid e-mail address.".to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let contract_id = dto
            .contract_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(contract_id) = &contract_id {
            UserService::ensure_contract_exists(clients, contract_id).await?;
        }

        let email = dto.email.trim().to_string();
        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered.".to_string()));
        }

        let stamp = now.naive_utc();
        let user = users
            .insert(user::Model {
                id: 0,
                name: dto.name.trim().to_string(),
                email,
                password: hash_password(&dto.password).await?,
                role: ROLE_REGULAR,
                contract_id,
                password_reset_token: None,
                created_at: stamp,
                updated_at: stamp,
            })
            .await?;

        tracing::info!("User {} signed up", user.id);
        Self::issue_token(config, &user, now)
    }

    pub async fn signin(
        users: &dyn UserRepository,
        config: &Config,
        dto: SigninDto,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let user = users
            .find_by_email(dto.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&dto.password, &user.password).await {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Self::issue_token(config, &user, now)
    }

    /// Stores a one-hour reset token on the user and mails the link.
    pub async fn request_password_reset(
        users: &dyn UserRepository,
        mailer: &dyn EmailProvider,
        config: &Config,
        email: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut user = users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::validation("email", "No account uses this e-mail."))?;

        let token = Self::sign(
            config,
            &ResetClaims {
                id: user.id,
                iat: now.timestamp() as usize,
                exp: (now + Duration::minutes(RESET_TOKEN_TTL_MINUTES)).timestamp() as usize,
            },
        )?;

        user.password_reset_token = Some(token.clone());
        user.updated_at = now.naive_utc();
        let user = users.update(user).await?;

        let link = format!("{}?token={}", config.password_reset_url, token);
        mailer.send_password_reset(&user.email, &link).await
    }

    pub async fn reset_password(
        users: &dyn UserRepository,
        config: &Config,
        dto: ResetPasswordDto,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let invalid = || AppError::validation("token", INVALID_RESET_TOKEN);

        if dto.password.trim().is_empty() {
            return Err(AppError::validation("password", "password is required."));
        }

        let claims = decode::<ResetClaims>(
            &dto.token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| invalid())?
        .claims;

        let mut user = users.find_by_id(claims.id).await?.ok_or_else(invalid)?;
        if user.password_reset_token.as_deref() != Some(dto.token.as_str()) {
            return Err(invalid());
        }

        user.password = hash_password(&dto.password).await?;
        user.password_reset_token = None;
        user.updated_at = now.naive_utc();
        users.update(user).await?;

        tracing::info!("Password reset for user {}", claims.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::clients::infra::persistence::InMemoryClientRepository;
    use crate::modules::users::infra::persistence::InMemoryUserRepository;
    use crate::shared::config::test_config;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EmailProvider for RecordingMailer {
        async fn send_password_reset(&self, to: &str, link: &str) -> AppResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), link.to_string()));
            Ok(())
        }
    }

    fn signup_dto(email: &str) -> SignupDto {
        SignupDto {
            name: "Taro".to_string(),
            email: email.to_string(),
            password: "pa55word".to_string(),
            contract_id: None,
        }
    }

    #[tokio::test]
    async fn test_signup_then_signin() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let clients = InMemoryClientRepository::new();

        let token = AuthService::signup(&users, &clients, &config, signup_dto("t@example.com"), Utc::now())
            .await
            .unwrap();
        let claims = AuthService::verify_token(&config, &token).unwrap();
        assert!(!claims.is_manager());

        let dto = SigninDto {
            email: "t@example.com".to_string(),
            password: "pa55word".to_string(),
        };
        let token = AuthService::signin(&users, &config, dto, Utc::now()).await.unwrap();
        assert_eq!(AuthService::verify_token(&config, &token).unwrap().id, claims.id);
    }

    #[tokio::test]
    async fn test_signup_reports_every_missing_field() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let clients = InMemoryClientRepository::new();

        let err = AuthService::signup(&users, &clients, &config, SignupDto::default(), Utc::now())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflicts() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let clients = InMemoryClientRepository::new();
        AuthService::signup(&users, &clients, &config, signup_dto("t@example.com"), Utc::now())
            .await
            .unwrap();

        let err = AuthService::signup(&users, &clients, &config, signup_dto("t@example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_signin_hides_which_part_was_wrong() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let clients = InMemoryClientRepository::new();
        AuthService::signup(&users, &clients, &config, signup_dto("t@example.com"), Utc::now())
            .await
            .unwrap();

        let wrong_password = SigninDto {
            email: "t@example.com".to_string(),
            password: "nope".to_string(),
        };
        let unknown_email = SigninDto {
            email: "x@example.com".to_string(),
            password: "pa55word".to_string(),
        };

        for dto in [wrong_password, unknown_email] {
            match AuthService::signin(&users, &config, dto, Utc::now()).await {
                Err(AppError::Unauthorized(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("expected unauthorized, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let config = test_config();
        let user = user::Model {
            id: 1,
            name: "Taro".to_string(),
            email: "t@example.com".to_string(),
            password: String::new(),
            role: 1,
            contract_id: None,
            password_reset_token: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        let stale = AuthService::issue_token(&config, &user, Utc::now() - Duration::hours(3)).unwrap();
        assert!(matches!(
            AuthService::verify_token(&config, &stale),
            Err(AppError::TokenExpired)
        ));

        assert!(matches!(
            AuthService::verify_token(&config, "garbage"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let clients = InMemoryClientRepository::new();
        let mailer = RecordingMailer::default();
        AuthService::signup(&users, &clients, &config, signup_dto("t@example.com"), Utc::now())
            .await
            .unwrap();

        AuthService::request_password_reset(&users, &mailer, &config, "t@example.com", Utc::now())
            .await
            .unwrap();

        let (to, link) = mailer.sent.lock().unwrap()[0].clone();
        assert_eq!(to, "t@example.com");
        let token = link
            .split_once("?token=")
            .map(|(_, t)| t.to_string())
            .unwrap();

        let dto = ResetPasswordDto {
            token: token.clone(),
            password: "brand-new".to_string(),
        };
        AuthService::reset_password(&users, &config, dto, Utc::now())
            .await
            .unwrap();

        let signin = SigninDto {
            email: "t@example.com".to_string(),
            password: "brand-new".to_string(),
        };
        assert!(AuthService::signin(&users, &config, signin, Utc::now()).await.is_ok());

        // Token is single-use
        let replay = ResetPasswordDto {
            token,
            password: "again".to_string(),
        };
        assert!(matches!(
            AuthService::reset_password(&users, &config, replay, Utc::now()).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_password_reset_unknown_email() {
        let config = test_config();
        let users = InMemoryUserRepository::new();
        let mailer = RecordingMailer::default();

        let err = AuthService::request_password_reset(&users, &mailer, &config, "no@example.com", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
