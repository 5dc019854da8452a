use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    payment: Payment,
    mail: Option<Mail>,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_client_url")]
    client_url: String,
    #[serde(default = "default_uploads_dir")]
    uploads_dir: String,
    #[serde(default = "default_upload_limit")]
    upload_limit: usize,
}

/// Razorpay credentials and order defaults.
#[derive(Debug, Deserialize)]
pub struct Payment {
    key_id: String,
    key_secret: String,
    #[serde(default = "default_payment_api_base")]
    api_base: String,
    #[serde(default = "default_currency")]
    currency: String,
}

/// SMTP relay settings. Without this table outgoing mail is only logged.
#[derive(Debug, Deserialize)]
pub struct Mail {
    smtp_host: String,
    #[serde(default = "default_smtp_port")]
    smtp_port: u16,
    username: String,
    password: String,
    from: String,
    contact_inbox: String,
}

fn default_client_url() -> String {
    String::from("http://localhost:3000")
}

fn default_uploads_dir() -> String {
    String::from("uploads")
}

fn default_upload_limit() -> usize {
    100 * 1024 * 1024
}

fn default_payment_api_base() -> String {
    String::from("https://api.razorpay.com/v1")
}

fn default_currency() -> String {
    String::from("INR")
}

fn default_smtp_port() -> u16 {
    587
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let config = match Self::load(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                };

                config
            })
            .await
    }

    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let bytes = read_config(use_local)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        if config.app.jwt.trim().is_empty() {
            return Err(ConfigError::Invalid("app.jwt must not be empty"));
        }
        if config.payment.key_secret.is_empty() {
            return Err(ConfigError::Invalid("payment.key_secret must not be empty"));
        }
        Ok(config)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    #[inline]
    pub fn mail(&self) -> Option<&Mail> {
        self.mail.as_ref()
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn client_url(&self) -> &str {
        self.client_url.trim_end_matches('/')
    }

    #[inline]
    pub fn uploads_dir(&self) -> &str {
        &self.uploads_dir
    }

    #[inline]
    pub fn upload_limit(&self) -> usize {
        self.upload_limit
    }
}

impl Payment {
    #[inline]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[inline]
    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    #[inline]
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Mail {
    #[inline]
    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    #[inline]
    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[inline]
    pub fn from(&self) -> &str {
        &self.from
    }

    #[inline]
    pub fn contact_inbox(&self) -> &str {
        &self.contact_inbox
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
        assert_eq!(config.payment().currency(), "INR");
    }

    #[test]
    fn config_defaults_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/db"

            [payment]
            key_id = "rzp_test"
            key_secret = "shh"
        "#;

        let config = Config::from_slice(raw).unwrap();
        assert!(!config.app().docs());
        assert_eq!(config.app().client_url(), "http://localhost:3000");
        assert_eq!(config.app().uploads_dir(), "uploads");
        assert_eq!(config.payment().api_base(), "https://api.razorpay.com/v1");
        assert!(config.mail().is_none());
    }

    #[test]
    fn config_mail_table_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/db"
            client_url = "https://coursebay.example/"

            [payment]
            key_id = "rzp_test"
            key_secret = "shh"

            [mail]
            smtp_host = "smtp.example.com"
            username = "mailer"
            password = "hunter2"
            from = "coursebay <noreply@example.com>"
            contact_inbox = "support@example.com"
        "#;

        let config = Config::from_slice(raw).unwrap();
        let mail = config.mail().unwrap();
        assert_eq!(mail.smtp_port(), 587);
        assert_eq!(mail.contact_inbox(), "support@example.com");
        assert_eq!(config.app().client_url(), "https://coursebay.example");
    }

    #[test]
    fn config_missing_payment_fails_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/db"
        "#;

        assert!(matches!(
            Config::from_slice(raw),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn config_empty_secret_fails_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "  "
            database_uri = "postgres://localhost/db"

            [payment]
            key_id = "rzp_test"
            key_secret = "shh"
        "#;

        assert!(matches!(Config::from_slice(raw), Err(ConfigError::Invalid(_))));
    }
}
