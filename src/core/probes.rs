//! # Probes Module / 探针模块
//!
//! Each probe gathers evidence from the data source and/or the API and
//! classifies one invariant. Probes never mutate external state: every
//! statement here is a parameterized SELECT and every request is single-shot.
//!
//! 每个探针从数据源和/或 API 收集证据，并对一个不变量进行分类。
//! 探针从不修改外部状态：这里的每条语句都是参数化的 SELECT，每个请求都只发送一次。

use std::time::Duration;

use crate::core::config::ProbeKind;
use crate::core::error::ProbeError;
use crate::core::models::{Outcome, Row, SqlValue};
use crate::infra::database::DataSource;
use crate::infra::http::ApiClient;
use crate::infra::t;

pub const TABLE_EXISTS_SQL: &str = "SELECT TABLE_NAME AS table_name \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?";

pub const TABLE_COLUMNS_SQL: &str = "SELECT COLUMN_NAME AS column_name \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

pub const RECENT_SHARES_SQL: &str = "SELECT s.id, s.share_id, s.post_id, s.sender_id, \
            s.receiver_id, s.share_message, s.create_time, p.title AS post_title, \
            u1.username AS sender_name, u2.username AS receiver_name \
     FROM shares s \
     LEFT JOIN posts p ON s.post_id = p.id \
     LEFT JOIN users u1 ON s.sender_id = u1.id \
     LEFT JOIN users u2 ON s.receiver_id = u2.id \
     ORDER BY s.create_time DESC \
     LIMIT ?";

pub const POST_LOOKUP_SQL: &str = "SELECT p.id, p.post_id, p.title, p.description, p.like_count, \
            p.favorite_count, i.thumbnail_url \
     FROM posts p \
     LEFT JOIN (SELECT post_id, thumbnail_url FROM images WHERE display_order = 0) i \
       ON p.id = i.post_id \
     WHERE p.id = ?";

pub const FOLLOW_PAIR_SQL: &str = "SELECT follower_id, followee_id \
     FROM follows \
     WHERE (follower_id = ? AND followee_id = ?) \
        OR (follower_id = ? AND followee_id = ?)";

/// Longest description excerpt shown for a post.
const DESCRIPTION_EXCERPT: usize = 50;
/// Longest response body echoed by the endpoint probe.
const BODY_EXCERPT: usize = 2048;

/// What a probe concluded, plus the evidence it printed along the way.
/// 探针得出的结论，以及过程中输出的证据。
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub outcome: Outcome,
    pub details: Vec<String>,
}

impl ProbeReport {
    pub fn new(outcome: Outcome, details: Vec<String>) -> Self {
        Self { outcome, details }
    }
}

/// Evaluates one probe. Errors returned here are converted into an outcome
/// by the runner; they never end the run.
///
/// 评估一个探针。这里返回的错误由运行器转换为结果，不会结束整个运行。
pub async fn run_probe<D, A>(
    kind: &ProbeKind,
    source: &D,
    api: &A,
    locale: &str,
) -> Result<ProbeReport, ProbeError>
where
    D: DataSource,
    A: ApiClient,
{
    match kind {
        ProbeKind::SchemaShape { table, columns } => {
            schema_shape(source, table, columns, locale).await
        }
        ProbeKind::ShareJoin { limit } => share_join(source, *limit, locale).await,
        ProbeKind::PostLookup { post_id, required } => {
            post_lookup(source, *post_id, required, locale).await
        }
        ProbeKind::UserLookup { user_ids } => user_lookup(source, user_ids, locale).await,
        ProbeKind::MutualFollow { user_a, user_b } => {
            mutual_follow(source, *user_a, *user_b, locale).await
        }
        ProbeKind::Liveness { path, timeout_secs } => {
            liveness(api, path, Duration::from_secs(*timeout_secs), locale).await
        }
        ProbeKind::Endpoint {
            method,
            path,
            auth,
            timeout_secs,
        } => {
            endpoint(
                api,
                method,
                path,
                *auth,
                timeout_secs.map(Duration::from_secs),
                locale,
            )
            .await
        }
    }
}

/// Checks that `table` exists and that every expected column is present.
/// Each column is reported on its own line, so a partial mismatch still
/// shows which columns are fine.
///
/// 检查 `table` 是否存在以及每个预期列是否都存在。
/// 每一列单独报告一行，因此部分不匹配时仍能看出哪些列是正常的。
pub async fn schema_shape<D: DataSource>(
    source: &D,
    table: &str,
    expected: &[String],
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let tables = source.query(TABLE_EXISTS_SQL, &[SqlValue::from(table)]).await;
    if tables.is_empty() {
        return Ok(ProbeReport::new(
            Outcome::fail(t!("probe.schema.table_missing", locale = locale, table = table)),
            Vec::new(),
        ));
    }

    let actual: Vec<String> = source
        .query(TABLE_COLUMNS_SQL, &[SqlValue::from(table)])
        .await
        .iter()
        .filter_map(|row| row.get("column_name").map(|v| v.to_string()))
        .collect();

    let mut details =
        vec![t!("probe.schema.table_present", locale = locale, table = table).to_string()];
    let mut missing = Vec::new();
    for column in expected {
        if actual.iter().any(|c| c.eq_ignore_ascii_case(column)) {
            details.push(
                t!("probe.schema.column_present", locale = locale, column = column).to_string(),
            );
        } else {
            details.push(
                t!("probe.schema.column_missing", locale = locale, column = column).to_string(),
            );
            missing.push(column.as_str());
        }
    }

    let outcome = if missing.is_empty() {
        Outcome::pass(t!(
            "probe.schema.all_present",
            locale = locale,
            table = table,
            count = expected.len()
        ))
    } else {
        Outcome::fail(t!(
            "probe.schema.columns_missing",
            locale = locale,
            table = table,
            columns = missing.join(", ")
        ))
    };
    Ok(ProbeReport::new(outcome, details))
}

/// Resolves the most recent shares against their post and both users.
/// No shares at all is a warning: an empty table is not a broken one.
///
/// 将最近的分享记录与其帖子及双方用户关联。
/// 完全没有分享记录只是警告：空表并不等于损坏的表。
pub async fn share_join<D: DataSource>(
    source: &D,
    limit: u32,
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let shares = source.query(RECENT_SHARES_SQL, &[SqlValue::from(limit)]).await;
    if shares.is_empty() {
        return Ok(ProbeReport::new(
            Outcome::warn(t!("probe.share.none_found", locale = locale)),
            Vec::new(),
        ));
    }

    let details = shares
        .iter()
        .flat_map(|share| describe_share(share, locale))
        .collect();
    Ok(ProbeReport::new(
        Outcome::pass(t!("probe.share.found", locale = locale, count = shares.len())),
        details,
    ))
}

/// Renders one joined share row as report lines.
/// 将一条关联后的分享记录渲染为报告行。
pub fn describe_share(share: &Row, locale: &str) -> Vec<String> {
    let none = t!("common.none", locale = locale);
    vec![
        t!("probe.share.id", locale = locale, id = share.render("share_id", &none)).to_string(),
        t!(
            "probe.share.post",
            locale = locale,
            title = share.render("post_title", &none),
            id = share.render("post_id", &none)
        )
        .to_string(),
        format!(
            "  {} (ID:{}) → {} (ID:{})",
            share.render("sender_name", &none),
            share.render("sender_id", &none),
            share.render("receiver_name", &none),
            share.render("receiver_id", &none)
        ),
        t!(
            "probe.share.message",
            locale = locale,
            message = share.render("share_message", &none)
        )
        .to_string(),
        t!(
            "probe.share.time",
            locale = locale,
            time = share.render("create_time", &none)
        )
        .to_string(),
    ]
}

/// Fetches one post with its cover image and checks its required fields.
/// 获取一个帖子及其封面图，并检查必填字段。
pub async fn post_lookup<D: DataSource>(
    source: &D,
    post_id: i64,
    required: &[String],
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let rows = source.query(POST_LOOKUP_SQL, &[SqlValue::from(post_id)]).await;
    let Some(post) = rows.first() else {
        return Ok(ProbeReport::new(
            Outcome::fail(t!("probe.post.not_found", locale = locale, id = post_id)),
            Vec::new(),
        ));
    };

    let none = t!("common.none", locale = locale);
    let description = post.render("description", &none);
    let description = if description.chars().count() > DESCRIPTION_EXCERPT {
        format!("{}...", description.chars().take(DESCRIPTION_EXCERPT).collect::<String>())
    } else {
        description
    };

    let details = vec![
        t!("probe.post.physical_id", locale = locale, value = post.render("id", &none)).to_string(),
        t!(
            "probe.post.business_id",
            locale = locale,
            value = post.render("post_id", &none)
        )
        .to_string(),
        t!("probe.post.title", locale = locale, value = post.render("title", &none)).to_string(),
        t!("probe.post.description", locale = locale, value = description).to_string(),
        t!(
            "probe.post.likes",
            locale = locale,
            value = post.render("like_count", &none)
        )
        .to_string(),
        t!(
            "probe.post.favorites",
            locale = locale,
            value = post.render("favorite_count", &none)
        )
        .to_string(),
        t!(
            "probe.post.cover",
            locale = locale,
            value = post.render("thumbnail_url", &none)
        )
        .to_string(),
    ];

    let null_fields: Vec<&str> = required
        .iter()
        .filter(|field| post.is_null(field))
        .map(String::as_str)
        .collect();

    let outcome = if null_fields.is_empty() {
        Outcome::pass(t!("probe.post.found", locale = locale, id = post_id))
    } else {
        Outcome::fail(t!(
            "probe.post.fields_null",
            locale = locale,
            id = post_id,
            fields = null_fields.join(", ")
        ))
    };
    Ok(ProbeReport::new(outcome, details))
}

/// Looks up a set of users by id. None found fails; some missing warns.
/// 按 id 查询一组用户。全部未找到为失败；部分缺失为警告。
pub async fn user_lookup<D: DataSource>(
    source: &D,
    user_ids: &[i64],
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let statement = format!(
        "SELECT id, user_id, username, avatar_url, bio FROM users WHERE id IN ({}) ORDER BY id",
        placeholders
    );
    let params: Vec<SqlValue> = user_ids.iter().copied().map(SqlValue::from).collect();
    let users = source.query(&statement, &params).await;

    let ids = join_ids(user_ids);
    if users.is_empty() {
        return Ok(ProbeReport::new(
            Outcome::fail(t!("probe.user.none_found", locale = locale, ids = ids)),
            Vec::new(),
        ));
    }

    let none = t!("common.none", locale = locale);
    let mut details = Vec::new();
    for user in &users {
        details.push(format!(
            "- ID: {}, username: {}",
            user.render("id", &none),
            user.render("username", &none)
        ));
        details.push(
            t!(
                "probe.user.business_id",
                locale = locale,
                value = user.render("user_id", &none)
            )
            .to_string(),
        );
        details.push(
            t!(
                "probe.user.avatar",
                locale = locale,
                value = user.render("avatar_url", &none)
            )
            .to_string(),
        );
        details.push(
            t!("probe.user.bio", locale = locale, value = user.render("bio", &none)).to_string(),
        );
    }

    let found: Vec<i64> = users.iter().filter_map(|u| u.get_i64("id")).collect();
    let missing: Vec<i64> = user_ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();

    let outcome = if missing.is_empty() {
        Outcome::pass(t!("probe.user.found", locale = locale, count = users.len()))
    } else {
        Outcome::warn(t!("probe.user.some_missing", locale = locale, ids = join_ids(&missing)))
    };
    Ok(ProbeReport::new(outcome, details))
}

/// Counts follow edges in both directions between two users. Exactly one
/// edge each way passes; anything else is an incomplete relation and warns.
///
/// 统计两个用户之间双向的关注边。每个方向恰好一条边则通过；
/// 其他情况视为关系不完整并给出警告。
pub async fn mutual_follow<D: DataSource>(
    source: &D,
    user_a: i64,
    user_b: i64,
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let params: [SqlValue; 4] = [user_a.into(), user_b.into(), user_b.into(), user_a.into()];
    let edges = source.query(FOLLOW_PAIR_SQL, &params).await;

    let has_edge = |from: i64, to: i64| {
        edges
            .iter()
            .any(|e| e.get_i64("follower_id") == Some(from) && e.get_i64("followee_id") == Some(to))
    };
    let forward = has_edge(user_a, user_b);
    let backward = has_edge(user_b, user_a);

    let details = [(user_a, user_b, forward), (user_b, user_a, backward)]
        .into_iter()
        .map(|(from, to, present)| {
            if present {
                t!("probe.follow.edge_present", locale = locale, from = from, to = to).to_string()
            } else {
                t!("probe.follow.edge_missing", locale = locale, from = from, to = to).to_string()
            }
        })
        .collect();

    let count = edges.len();
    let outcome = if count == 2 && forward && backward {
        Outcome::pass(t!("probe.follow.mutual", locale = locale, a = user_a, b = user_b))
    } else {
        Outcome::warn(t!("probe.follow.incomplete", locale = locale, count = count))
    };
    Ok(ProbeReport::new(outcome, details))
}

/// Issues an unauthenticated GET. Any status below 500 means the server is
/// up, even if it rejected the request itself.
///
/// 发送一个未认证的 GET 请求。任何 500 以下的状态码都表示服务器在线，
/// 即使它拒绝了该请求本身。
pub async fn liveness<A: ApiClient>(
    api: &A,
    path: &str,
    timeout: Duration,
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    match api.request("GET", path, false, Some(timeout)).await {
        Ok(response) if response.is_live() => Ok(ProbeReport::new(
            Outcome::pass(t!("probe.live.up", locale = locale, status = response.status)),
            Vec::new(),
        )),
        Ok(response) => Ok(ProbeReport::new(
            Outcome::fail(t!("probe.live.server_error", locale = locale, status = response.status)),
            Vec::new(),
        )),
        Err(e) if e.is_connectivity() => Ok(ProbeReport::new(
            Outcome::fail(t!("probe.live.unreachable", locale = locale, error = e)),
            Vec::new(),
        )),
        Err(e) => Err(e),
    }
}

/// Sends one request and reports whatever comes back: status, headers and
/// body. Getting any response at all is the invariant.
///
/// 发送一个请求并报告返回的内容：状态码、响应头和响应体。
/// 能收到任何响应即满足不变量。
pub async fn endpoint<A: ApiClient>(
    api: &A,
    method: &str,
    path: &str,
    auth: bool,
    timeout: Option<Duration>,
    locale: &str,
) -> Result<ProbeReport, ProbeError> {
    let response = match api.request(method, path, auth, timeout).await {
        Ok(response) => response,
        Err(e) if e.is_connectivity() => {
            return Ok(ProbeReport::new(
                Outcome::fail(t!("probe.endpoint.no_response", locale = locale, error = e)),
                Vec::new(),
            ));
        }
        Err(e) => return Err(e),
    };

    let mut details =
        vec![t!("probe.endpoint.status", locale = locale, status = response.status).to_string()];
    details.push(t!("probe.endpoint.headers", locale = locale).to_string());
    for (name, value) in &response.headers {
        details.push(format!("  {}: {}", name, value));
    }
    let body = if response.body.chars().count() > BODY_EXCERPT {
        format!("{}...", response.body.chars().take(BODY_EXCERPT).collect::<String>())
    } else {
        response.body.clone()
    };
    details.push(t!("probe.endpoint.content", locale = locale, body = body).to_string());

    Ok(ProbeReport::new(
        Outcome::pass(t!(
            "probe.endpoint.responded",
            locale = locale,
            method = method.to_uppercase(),
            path = path,
            status = response.status
        )),
        details,
    ))
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
}
