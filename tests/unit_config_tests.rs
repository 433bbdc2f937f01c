//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Tests for parsing, defaulting, environment expansion and validation of the
//! check plan.
//!
//! 检查计划的解析、默认值、环境变量展开和校验测试。

use share_consistency::config::{starter_probes, CheckPlan, ProbeKind};
use std::collections::HashMap;

const BASE: &str = r#"
[database]
host = "db.internal"
user = "checker"
password = "secret"
database = "knot_image_sharing"

[api]
base_url = "http://localhost:8080"
"#;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

fn with_probes(probes: &str) -> String {
    format!("{}\n{}", BASE, probes)
}

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[test]
    fn test_minimal_plan_uses_defaults() {
        let plan = CheckPlan::from_toml_str(BASE, no_env).unwrap();

        assert_eq!(plan.language, "en");
        assert!(plan.warnings_as_failures);
        assert_eq!(plan.database.port, 3306);
        assert_eq!(plan.database.connect_timeout_secs, 5);
        assert_eq!(plan.database.query_timeout_secs, 10);
        assert_eq!(plan.api.timeout_secs, 10);
        assert!(plan.api.token.is_none());
        assert!(plan.probes.is_empty());
    }

    #[test]
    fn test_every_probe_kind_parses() {
        let content = with_probes(
            r#"
[[probes]]
name = "schema"
kind = "schema_shape"
table = "shares"
columns = ["id", "share_id"]

[[probes]]
name = "shares"
kind = "share_join"

[[probes]]
name = "post"
kind = "post_lookup"
post_id = 65

[[probes]]
name = "users"
kind = "user_lookup"
user_ids = [2, 35]

[[probes]]
name = "follow"
kind = "mutual_follow"
user_a = 2
user_b = 35

[[probes]]
name = "health"
kind = "liveness"

[[probes]]
name = "feed"
kind = "endpoint"
path = "/api/v1/shares"
"#,
        );
        let plan = CheckPlan::from_toml_str(&content, no_env).unwrap();
        let kinds: Vec<&str> = plan.probes.iter().map(|p| p.kind.tag()).collect();

        assert_eq!(
            kinds,
            vec![
                "schema_shape",
                "share_join",
                "post_lookup",
                "user_lookup",
                "mutual_follow",
                "liveness",
                "endpoint"
            ]
        );
        assert_eq!(plan.probes[1].kind, ProbeKind::ShareJoin { limit: 5 });
        assert_eq!(
            plan.probes[2].kind,
            ProbeKind::PostLookup {
                post_id: 65,
                required: vec!["id".to_string(), "post_id".to_string(), "title".to_string()],
            }
        );
        assert_eq!(
            plan.probes[5].kind,
            ProbeKind::Liveness {
                path: "/health".to_string(),
                timeout_secs: 5,
            }
        );
        assert_eq!(
            plan.probes[6].kind,
            ProbeKind::Endpoint {
                method: "GET".to_string(),
                path: "/api/v1/shares".to_string(),
                auth: true,
                timeout_secs: None,
            }
        );
    }

    #[test]
    fn test_probe_order_is_preserved() {
        let content = with_probes(
            r#"
[[probes]]
name = "zeta"
kind = "share_join"

[[probes]]
name = "alpha"
kind = "share_join"
"#,
        );
        let plan = CheckPlan::from_toml_str(&content, no_env).unwrap();
        let names: Vec<&str> = plan.probes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_unknown_probe_kind_is_rejected() {
        let content = with_probes(
            r#"
[[probes]]
name = "mystery"
kind = "drop_table"
"#,
        );
        assert!(CheckPlan::from_toml_str(&content, no_env).is_err());
    }

    #[test]
    fn test_missing_database_section_is_rejected() {
        let content = r#"
[api]
base_url = "http://localhost:8080"
"#;
        assert!(CheckPlan::from_toml_str(content, no_env).is_err());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = CheckPlan::load(std::path::Path::new("does/not/exist.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read check plan"));
    }
}

#[cfg(test)]
mod env_expansion_tests {
    use super::*;

    #[test]
    fn test_credentials_expand_from_environment() {
        let content = r#"
[database]
host = "${SHARE_DB_HOST}"
user = "$SHARE_DB_USER"
password = "${SHARE_DB_PASSWORD}"
database = "knot_image_sharing"

[api]
base_url = "http://${SHARE_DB_HOST}:8080"
token = "${SHARE_API_TOKEN}"
"#;
        let lookup = env_from(&[
            ("SHARE_DB_HOST", "10.0.0.7"),
            ("SHARE_DB_USER", "reader"),
            ("SHARE_DB_PASSWORD", "hunter2"),
            ("SHARE_API_TOKEN", "abc.def.ghi"),
        ]);
        let plan = CheckPlan::from_toml_str(content, lookup).unwrap();

        assert_eq!(plan.database.host, "10.0.0.7");
        assert_eq!(plan.database.user, "reader");
        assert_eq!(plan.database.password, "hunter2");
        assert_eq!(plan.api.base_url, "http://10.0.0.7:8080");
        assert_eq!(plan.api.token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_database_variable_is_an_error() {
        let content = r#"
[database]
host = "localhost"
user = "checker"
password = "${SHARE_DB_PASSWORD}"
database = "knot_image_sharing"

[api]
base_url = "http://localhost:8080"
"#;
        let err = CheckPlan::from_toml_str(content, no_env).unwrap_err();
        assert!(format!("{:#}", err).contains("database.password"));
    }

    #[test]
    fn test_missing_token_variable_leaves_token_unset() {
        let content = format!("{}token = \"${{SHARE_API_TOKEN}}\"\n", BASE);
        let plan = CheckPlan::from_toml_str(&content, no_env).unwrap();
        assert!(plan.api.token.is_none());
    }

    #[test]
    fn test_blank_token_is_treated_as_unset() {
        let content = format!("{}token = \"${{SHARE_API_TOKEN}}\"\n", BASE);
        let env = env_from(&[("SHARE_API_TOKEN", "  ")]);
        let plan = CheckPlan::from_toml_str(&content, env).unwrap();
        assert!(plan.api.token.is_none());
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn rejects(probes: &str) -> String {
        let content = with_probes(probes);
        let err = CheckPlan::from_toml_str(&content, no_env).unwrap_err();
        format!("{:#}", err)
    }

    #[test]
    fn test_duplicate_probe_names_are_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "twice"
kind = "share_join"

[[probes]]
name = "twice"
kind = "share_join"
"#,
        );
        assert!(message.contains("duplicate probe name: twice"));
    }

    #[test]
    fn test_schema_probe_needs_columns() {
        let message = rejects(
            r#"
[[probes]]
name = "schema"
kind = "schema_shape"
table = "shares"
columns = []
"#,
        );
        assert!(message.contains("at least one column"));
    }

    #[test]
    fn test_zero_share_limit_is_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "shares"
kind = "share_join"
limit = 0
"#,
        );
        assert!(message.contains("limit greater than zero"));
    }

    #[test]
    fn test_empty_user_list_is_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "users"
kind = "user_lookup"
user_ids = []
"#,
        );
        assert!(message.contains("at least one user id"));
    }

    #[test]
    fn test_self_follow_is_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "follow"
kind = "mutual_follow"
user_a = 2
user_b = 2
"#,
        );
        assert!(message.contains("two distinct users"));
    }

    #[test]
    fn test_invalid_http_method_is_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "feed"
kind = "endpoint"
method = "GE T"
path = "/api/v1/shares"
"#,
        );
        assert!(message.contains("invalid HTTP method"));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let content = BASE.replace("http://localhost:8080", "localhost:8080");
        let err = CheckPlan::from_toml_str(&content, no_env).unwrap_err();
        assert!(format!("{:#}", err).contains("api.base_url"));
    }

    #[test]
    fn test_zero_api_timeout_is_rejected() {
        let content = format!("{}timeout_secs = 0\n", BASE);
        assert!(CheckPlan::from_toml_str(&content, no_env).is_err());
    }

    #[test]
    fn test_zero_endpoint_timeout_is_rejected() {
        let message = rejects(
            r#"
[[probes]]
name = "delete-image"
kind = "endpoint"
method = "DELETE"
path = "/api/v1/images/1"
timeout_secs = 0
"#,
        );
        assert!(message.contains("delete-image"));
        assert!(message.contains("timeout greater than zero"));
    }
}

#[cfg(test)]
mod starter_tests {
    use super::*;

    #[test]
    fn test_starter_plan_round_trips_through_toml() {
        let starter = CheckPlan::starter();
        let text = toml::to_string_pretty(&starter).unwrap();

        assert!(text.contains("${SHARE_DB_PASSWORD}"));
        assert!(text.contains("${SHARE_API_TOKEN}"));

        let lookup = env_from(&[
            ("SHARE_DB_HOST", "localhost"),
            ("SHARE_DB_USER", "checker"),
            ("SHARE_DB_PASSWORD", "secret"),
            ("SHARE_API_TOKEN", "token"),
        ]);
        let parsed = CheckPlan::from_toml_str(&text, lookup).unwrap();
        assert_eq!(parsed.probes, starter_probes());
        assert_eq!(parsed.database.database, "knot_image_sharing");
    }

    #[test]
    fn test_starter_probes_are_valid_and_unique() {
        let probes = starter_probes();
        assert_eq!(probes.len(), 6);
        let mut names: Vec<&str> = probes.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
