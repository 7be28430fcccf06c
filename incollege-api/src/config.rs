use serde::Deserialize;

use incollege_shared::middleware::LogFormat;

/// Which postings count against the live posting cap.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPostingCapScope {
    Global,
    PerOwner,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db")]
    pub database_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_secs: i64,
    #[serde(default = "default_pool_size")]
    pub db_pool_size: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_users")]
    pub max_users: i64,
    #[serde(default = "default_max_experiences")]
    pub max_experiences: i64,
    #[serde(default = "default_job_posting_limit")]
    pub job_posting_limit: i64,
    #[serde(default = "default_cap_scope")]
    pub job_posting_cap_scope: JobPostingCapScope,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_port() -> u16 { 8000 }
fn default_db() -> String { "incollege.db".into() }
fn default_jwt_secret() -> String { "development-secret-change-in-production".into() }
fn default_jwt_ttl() -> i64 { 24 * 60 * 60 }
fn default_pool_size() -> u32 { 8 }
fn default_request_timeout() -> u64 { 5 }
fn default_max_users() -> i64 { 10 }
fn default_max_experiences() -> i64 { 3 }
fn default_job_posting_limit() -> i64 { 10 }
fn default_cap_scope() -> JobPostingCapScope { JobPostingCapScope::Global }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_db(),
            jwt_secret: default_jwt_secret(),
            jwt_ttl_secs: default_jwt_ttl(),
            db_pool_size: default_pool_size(),
            request_timeout_secs: default_request_timeout(),
            max_users: default_max_users(),
            max_experiences: default_max_experiences(),
            job_posting_limit: default_job_posting_limit(),
            job_posting_cap_scope: default_cap_scope(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("INCOLLEGE").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
