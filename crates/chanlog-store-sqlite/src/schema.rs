//! SQL schema for the chanlog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One opaque blob per channel; rows are only ever replaced by a longer
-- version of themselves.
CREATE TABLE IF NOT EXISTS channel_histories (
    channel_id    TEXT PRIMARY KEY,
    history_json  TEXT NOT NULL,   -- full ChannelHistory, RFC 3339 timestamps
    updated_at    TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
