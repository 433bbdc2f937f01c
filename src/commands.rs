//! # Commands Module / 命令模块
//!
//! Implementations behind each CLI subcommand.
//! 各个 CLI 子命令的实现。

pub mod init;
pub mod list;
pub mod run;
