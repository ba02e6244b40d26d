//! kvsink-core
//!
//! Reliable write pipeline for task records: commands come in, land in
//! an eventually-consistent KV store, get verified by read-back, and
//! failed writes are retried with bounded backoff.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, command, event）
//! - **ports**: 抽象化レイヤー（TaskRepository, WriteVerifier, CachePurger）
//! - **app**: アプリケーションロジック（bus, dispatch, handlers, saga, purge, inbound）
//! - **impls**: 実装（InMemoryTaskRepository, HTTP クライアント, 署名）
//! - **config**: 環境変数からの設定読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
