//! CLI command handlers

pub mod assist;
pub mod corpus;
pub mod enrich;
pub mod ingest;
pub mod search;
pub mod status;
