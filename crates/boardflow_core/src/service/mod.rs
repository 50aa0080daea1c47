//! Use-case services exposed to presentation layers and the CLI.

pub mod governance_service;
