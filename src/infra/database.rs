//! # Data Source Client / 数据源客户端
//!
//! Read-only access to the relational store under test. A failed query never
//! propagates: it is reported as a diagnostic and yields no rows, so the probe
//! that asked sees "no evidence" instead of aborting the run.
//!
//! 对被测关系型数据库的只读访问。失败的查询从不向上传播：
//! 它会作为诊断信息报告并返回空结果，使调用的探针看到“没有证据”而不是中止整个运行。

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Params, Value};
use std::future::Future;

use crate::core::config::DatabaseConfig;
use crate::core::error::ProbeError;
use crate::core::models::{Row, SqlValue};

/// A read-only query interface over the relational store.
/// 关系型数据库的只读查询接口。
pub trait DataSource {
    /// Executes a parameterized, read-only statement (`?` placeholders) and
    /// returns every row, or an empty vector if the query could not run.
    ///
    /// 执行参数化的只读语句（`?` 占位符）并返回所有行；若查询无法执行则返回空向量。
    fn query(&self, statement: &str, params: &[SqlValue]) -> impl Future<Output = Vec<Row>>;
}

/// MySQL-backed data source. Each query opens its own short-lived connection.
/// 基于 MySQL 的数据源。每次查询都会建立独立的短连接。
#[derive(Debug, Clone)]
pub struct MySqlSource {
    config: DatabaseConfig,
}

impl MySqlSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn opts(&self) -> OptsBuilder {
        let config = &self.config;
        OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
    }

    async fn try_query(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Row>, ProbeError> {
        let connect_timeout = self.config.connect_timeout();
        let mut conn = tokio::time::timeout(connect_timeout, Conn::new(self.opts()))
            .await
            .map_err(|_| {
                ProbeError::Connectivity(format!(
                    "connecting to {}:{} timed out after {}s",
                    self.config.host,
                    self.config.port,
                    connect_timeout.as_secs()
                ))
            })??;

        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(params.iter().map(to_mysql_value).collect())
        };

        let result: Result<Vec<mysql_async::Row>, mysql_async::Error> =
            conn.exec(statement, params).await;

        if let Err(e) = conn.disconnect().await {
            tracing::debug!("closing database connection failed: {}", e);
        }

        Ok(result?.into_iter().map(from_mysql_row).collect())
    }
}

impl DataSource for MySqlSource {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Vec<Row> {
        let query_timeout = self.config.query_timeout();
        let query = self.try_query(statement, params);
        let result = match tokio::time::timeout(query_timeout, query).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Connectivity(format!(
                "query timed out after {}s",
                query_timeout.as_secs()
            ))),
        };

        match result {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "query returned");
                rows
            }
            Err(e) => {
                tracing::warn!(error = %e, "database query failed");
                Vec::new()
            }
        }
    }
}

/// Converts a typed argument into the driver's value.
pub fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Int(v) => Value::Int(*v),
        SqlValue::UInt(v) => Value::UInt(*v),
        SqlValue::Float(v) => Value::Double(*v),
        SqlValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        SqlValue::Bytes(b) => Value::Bytes(b.clone()),
    }
}

/// Converts a driver value into a [`SqlValue`]. Text columns arrive as bytes
/// and are decoded as UTF-8 when possible; temporal values become text.
///
/// 将驱动值转换为 [`SqlValue`]。文本列以字节形式到达，尽可能按 UTF-8 解码；
/// 时间类型转换为文本。
pub fn from_mysql_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(v) => SqlValue::Int(v),
        Value::UInt(v) => SqlValue::UInt(v),
        Value::Float(v) => SqlValue::Float(f64::from(v)),
        Value::Double(v) => SqlValue::Float(v),
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(e) => SqlValue::Bytes(e.into_bytes()),
        },
        Value::Date(year, month, day, hour, minute, second, _micros) => SqlValue::Text(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )),
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if negative { "-" } else { "" };
            let hours = u64::from(days) * 24 + u64::from(hours);
            SqlValue::Text(format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds))
        }
    }
}

fn from_mysql_row(row: mysql_async::Row) -> Row {
    let names: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();
    let values = row.unwrap();
    Row::new(
        names
            .into_iter()
            .zip(values.into_iter().map(from_mysql_value))
            .collect(),
    )
}
