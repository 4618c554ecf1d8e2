//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - DTOs for inserts and partial updates where the table needs them
//!
//! Rows that carry secrets (the profile passcode hash) are `FromRow` only;
//! a separate response struct covers external-facing serialization.

pub mod alert;
pub mod call;
pub mod caller_list;
pub mod passcode;
pub mod profile;
