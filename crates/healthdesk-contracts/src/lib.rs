//! # healthdesk-contracts
//!
//! Shared record types and the unified error type for the HealthDesk
//! assistants.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod chat;
pub mod claim;
pub mod diagnosis;
pub mod document;
pub mod error;
pub mod treatment;
