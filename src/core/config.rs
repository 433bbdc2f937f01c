//! # Check Plan Configuration / 检查计划配置
//!
//! The check plan is loaded from a TOML file (`ConsistencyCheck.toml` by
//! default). It carries the connection settings for both external systems and
//! the ordered list of probes to run. String settings may reference
//! environment variables (`${SHARE_DB_PASSWORD}`); credentials never live in
//! the binary.
//!
//! 检查计划从 TOML 文件（默认为 `ConsistencyCheck.toml`）加载。
//! 它包含两个外部系统的连接设置以及要运行的有序探针列表。
//! 字符串配置可以引用环境变量（`${SHARE_DB_PASSWORD}`）；凭据从不写入二进制文件。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env::VarError;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Connection settings for the relational store.
/// 关系型数据库的连接设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    /// Upper bound for opening a connection / 建立连接的超时上限
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Upper bound for a single query, connection included / 单次查询（含连接）的超时上限
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Settings for the HTTP service under test.
/// 被测 HTTP 服务的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token issued elsewhere; the runner never mints one.
    /// 由外部签发的 Bearer 令牌；运行器从不自行生成。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A named probe in the plan. / 计划中的一个具名探针。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ProbeKind,
}

/// The invariant a probe checks, with its typed arguments.
/// 探针检查的不变量及其类型化参数。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeKind {
    /// The table exists and `columns` is a subset of its columns.
    /// 表存在，且 `columns` 是其列集合的子集。
    SchemaShape { table: String, columns: Vec<String> },
    /// Recent shares resolve against posts and both users.
    /// 最近的分享记录能关联到帖子及双方用户。
    ShareJoin {
        #[serde(default = "default_share_limit")]
        limit: u32,
    },
    /// A post exists with its required fields populated.
    /// 帖子存在且必填字段不为空。
    PostLookup {
        post_id: i64,
        #[serde(default = "default_post_required")]
        required: Vec<String>,
    },
    /// Every listed user exists. / 所列用户均存在。
    UserLookup { user_ids: Vec<i64> },
    /// Both follow edges between two users are present.
    /// 两个用户之间的双向关注边都存在。
    MutualFollow { user_a: i64, user_b: i64 },
    /// The service answers an unauthenticated request with a status below 500.
    /// 服务对未认证请求返回 500 以下的状态码。
    Liveness {
        #[serde(default = "default_health_path")]
        path: String,
        #[serde(default = "default_liveness_timeout")]
        timeout_secs: u64,
    },
    /// A single request to an endpoint gets any response at all.
    /// 对某个端点的单次请求能收到响应。
    Endpoint {
        #[serde(default = "default_method")]
        method: String,
        path: String,
        #[serde(default = "default_true")]
        auth: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
}

impl ProbeKind {
    /// The `kind` tag as written in the plan.
    pub fn tag(&self) -> &'static str {
        match self {
            ProbeKind::SchemaShape { .. } => "schema_shape",
            ProbeKind::ShareJoin { .. } => "share_join",
            ProbeKind::PostLookup { .. } => "post_lookup",
            ProbeKind::UserLookup { .. } => "user_lookup",
            ProbeKind::MutualFollow { .. } => "mutual_follow",
            ProbeKind::Liveness { .. } => "liveness",
            ProbeKind::Endpoint { .. } => "endpoint",
        }
    }

    /// A one-line description of the probe's arguments.
    pub fn describe(&self) -> String {
        match self {
            ProbeKind::SchemaShape { table, columns } => {
                format!("{}({})", table, columns.join(", "))
            }
            ProbeKind::ShareJoin { limit } => format!("shares ⋈ posts ⋈ users, limit {}", limit),
            ProbeKind::PostLookup { post_id, required } => {
                format!("posts.id = {}, required [{}]", post_id, required.join(", "))
            }
            ProbeKind::UserLookup { user_ids } => {
                let ids: Vec<String> = user_ids.iter().map(i64::to_string).collect();
                format!("users.id in [{}]", ids.join(", "))
            }
            ProbeKind::MutualFollow { user_a, user_b } => format!("{} ⇄ {}", user_a, user_b),
            ProbeKind::Liveness { path, timeout_secs } => {
                format!("GET {} ({}s)", path, timeout_secs)
            }
            ProbeKind::Endpoint {
                method, path, auth, ..
            } => {
                if *auth {
                    format!("{} {} (bearer)", method.to_uppercase(), path)
                } else {
                    format!("{} {}", method.to_uppercase(), path)
                }
            }
        }
    }
}

/// Represents the entire check plan, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个检查计划。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CheckPlan {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Whether a `warn` outcome counts against the run. Defaults to `true`.
    /// `warn` 结果是否计为失败。默认为 `true`。
    #[serde(default = "default_true")]
    pub warnings_as_failures: bool,

    pub database: DatabaseConfig,
    pub api: ApiConfig,

    /// The probes to execute, in order. / 按顺序执行的探针。
    #[serde(default)]
    pub probes: Vec<ProbeSpec>,
}

impl CheckPlan {
    /// Reads, parses, expands and validates a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read check plan: {}", path.display()))?;
        Self::from_toml_str(&content, |name| std::env::var(name).ok())
            .with_context(|| format!("Invalid check plan: {}", path.display()))
    }

    /// Parses a plan, resolving `$VAR`/`${VAR}` references through `lookup`.
    ///
    /// 解析检查计划，并通过 `lookup` 解析 `$VAR`/`${VAR}` 引用。
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut plan: CheckPlan =
            toml::from_str(content).context("Failed to parse check plan TOML")?;
        plan.expand_env(&lookup)?;
        plan.validate()?;
        Ok(plan)
    }

    fn expand_env<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        db.host = expand(&db.host, lookup).context("database.host")?;
        db.user = expand(&db.user, lookup).context("database.user")?;
        db.password = expand(&db.password, lookup).context("database.password")?;
        db.database = expand(&db.database, lookup).context("database.database")?;

        self.api.base_url = expand(&self.api.base_url, lookup).context("api.base_url")?;

        // An unset token variable just means unauthenticated probes only.
        self.api.token = match self.api.token.take() {
            Some(raw) => match expand(&raw, lookup) {
                Ok(token) if !token.trim().is_empty() => Some(token),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("api.token left unset: {:#}", e);
                    None
                }
            },
            None => None,
        };
        Ok(())
    }

    /// Rejects plans that cannot be executed meaningfully.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        if self.database.connect_timeout_secs == 0 || self.database.query_timeout_secs == 0 {
            bail!("database timeouts must be greater than zero");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            bail!("api.base_url must start with http:// or https://");
        }

        let mut seen = HashSet::new();
        for probe in &self.probes {
            if probe.name.trim().is_empty() {
                bail!("probe names must not be empty");
            }
            if !seen.insert(probe.name.as_str()) {
                bail!("duplicate probe name: {}", probe.name);
            }
            match &probe.kind {
                ProbeKind::SchemaShape { table, columns } => {
                    if table.trim().is_empty() || columns.is_empty() {
                        bail!("probe '{}' needs a table and at least one column", probe.name);
                    }
                }
                ProbeKind::ShareJoin { limit } if *limit == 0 => {
                    bail!("probe '{}' needs a limit greater than zero", probe.name);
                }
                ProbeKind::UserLookup { user_ids } if user_ids.is_empty() => {
                    bail!("probe '{}' needs at least one user id", probe.name);
                }
                ProbeKind::MutualFollow { user_a, user_b } if user_a == user_b => {
                    bail!("probe '{}' needs two distinct users", probe.name);
                }
                ProbeKind::Liveness { timeout_secs, .. } if *timeout_secs == 0 => {
                    bail!("probe '{}' needs a timeout greater than zero", probe.name);
                }
                ProbeKind::Endpoint {
                    timeout_secs: Some(0),
                    ..
                } => {
                    bail!("probe '{}' needs a timeout greater than zero", probe.name);
                }
                ProbeKind::Endpoint { method, .. }
                    if reqwest::Method::from_bytes(method.to_uppercase().as_bytes()).is_err() =>
                {
                    bail!("probe '{}' has an invalid HTTP method: {}", probe.name, method);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The plan written by `init`: the share feature's standard sweep.
    ///
    /// `init` 生成的计划：分享功能的标准检查序列。
    pub fn starter() -> Self {
        CheckPlan {
            language: default_language(),
            warnings_as_failures: true,
            database: DatabaseConfig {
                host: "${SHARE_DB_HOST}".to_string(),
                port: default_db_port(),
                user: "${SHARE_DB_USER}".to_string(),
                password: "${SHARE_DB_PASSWORD}".to_string(),
                database: "knot_image_sharing".to_string(),
                connect_timeout_secs: default_connect_timeout(),
                query_timeout_secs: default_query_timeout(),
            },
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                token: Some("${SHARE_API_TOKEN}".to_string()),
                timeout_secs: default_api_timeout(),
            },
            probes: starter_probes(),
        }
    }
}

/// The standard probe sequence for the share feature.
/// 分享功能的标准探针序列。
pub fn starter_probes() -> Vec<ProbeSpec> {
    vec![
        ProbeSpec {
            name: "shares-schema".to_string(),
            kind: ProbeKind::SchemaShape {
                table: "shares".to_string(),
                columns: [
                    "id",
                    "share_id",
                    "post_id",
                    "sender_id",
                    "receiver_id",
                    "share_message",
                    "create_time",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
            },
        },
        ProbeSpec {
            name: "recent-shares".to_string(),
            kind: ProbeKind::ShareJoin {
                limit: default_share_limit(),
            },
        },
        ProbeSpec {
            name: "shared-post".to_string(),
            kind: ProbeKind::PostLookup {
                post_id: 65,
                required: default_post_required(),
            },
        },
        ProbeSpec {
            name: "share-participants".to_string(),
            kind: ProbeKind::UserLookup {
                user_ids: vec![2, 35],
            },
        },
        ProbeSpec {
            name: "mutual-follow".to_string(),
            kind: ProbeKind::MutualFollow {
                user_a: 2,
                user_b: 35,
            },
        },
        ProbeSpec {
            name: "api-health".to_string(),
            kind: ProbeKind::Liveness {
                path: default_health_path(),
                timeout_secs: default_liveness_timeout(),
            },
        },
    ]
}

fn expand<F>(raw: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    shellexpand::env_with_context(raw, |name| {
        lookup(name).map(Some).ok_or(VarError::NotPresent)
    })
    .map(|expanded| expanded.into_owned())
    .map_err(|e| anyhow::anyhow!("environment variable ${} is not set: {}", e.var_name, e.cause))
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_db_port() -> u16 {
    3306
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_query_timeout() -> u64 {
    10
}

fn default_api_timeout() -> u64 {
    10
}

fn default_share_limit() -> u32 {
    5
}

fn default_post_required() -> Vec<String> {
    vec!["id".to_string(), "post_id".to_string(), "title".to_string()]
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_liveness_timeout() -> u64 {
    5
}

fn default_method() -> String {
    "GET".to_string()
}
