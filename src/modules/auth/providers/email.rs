use crate::shared::config::Config;
use crate::shared::error::{AppError, AppResult};
use askama::Template;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const RESET_SUBJECT: &str = "パスワードリセット";

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_password_reset(&self, to: &str, link: &str) -> AppResult<()>;
}

pub struct SmtpMailer {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpMailer {
    /// Dev and test builds get a mailer that only logs.
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.app_env == "dev" || config.app_env == "test" {
            return Ok(Self {
                mailer: None,
                from: "no-reply@localhost".to_string(),
            });
        }

        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::InternalServerError(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self {
            mailer: Some(mailer),
            from: config.smtp_user.clone(),
        })
    }
}

/// The link is HTML-escaped by the template in both the attribute and the text.
#[derive(Template)]
#[template(
    ext = "html",
    source = "<p>パスワードリセットのリクエストを受け付けました。</p>\
<p>下記のリンクから新しいパスワードを設定してください。リンクの有効期限は1時間です。</p>\
<p><a href=\"{{ link }}\">{{ link }}</a></p>\
<p>このメールに心当たりがない場合は破棄してください。</p>"
)]
struct ResetMail<'a> {
    link: &'a str,
}

fn reset_body(link: &str) -> AppResult<String> {
    ResetMail { link }
        .render()
        .map_err(|e| AppError::InternalServerError(format!("Failed to render email: {}", e)))
}

#[async_trait]
impl EmailProvider for SmtpMailer {
    async fn send_password_reset(&self, to: &str, link: &str) -> AppResult<()> {
        let Some(mailer) = &self.mailer else {
            tracing::info!("[DEV] Password reset link for {}: {}", to, link);
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.parse().map_err(|e| {
                AppError::InternalServerError(format!("Invalid from address: {}", e))
            })?)
            .to(to
                .parse()
                .map_err(|_| AppError::validation("email", "Invalid e-mail address."))?)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(reset_body(link)?)
            .map_err(|e| AppError::InternalServerError(format!("Failed to build email: {}", e)))?;

        mailer.send(email).await.map_err(|e| {
            AppError::InternalServerError(format!("Failed to send email: {}", e))
        })?;

        tracing::info!("Password reset mail sent to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::test_config;

    #[tokio::test]
    async fn test_mailer_logs_only_in_test_env() {
        let provider = SmtpMailer::new(&test_config()).unwrap();
        assert!(provider.mailer.is_none());

        let result = provider
            .send_password_reset("user@example.com", "http://localhost/reset?token=abc")
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_reset_body_embeds_link() {
        let body = reset_body("token=abc").unwrap();
        assert_eq!(body.matches("token=abc").count(), 2);
        assert!(body.contains("パスワードリセット"));
    }

    #[test]
    fn test_reset_body_escapes_markup_in_link() {
        let body = reset_body("x\"><script>alert(1)</script>").unwrap();
        assert!(!body.contains("<script>"));
        assert!(!body.contains("x\">"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
