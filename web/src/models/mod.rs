//! Data models exchanged by the users service.

/// User models and the in-memory store.
pub mod users;
