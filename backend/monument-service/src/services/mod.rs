//! Core services: identification (model call + reply normalization) and
//! community posts (media uploads + per-monument collections).

pub mod community;
pub mod identification;

pub use community::CommunityService;
pub use identification::IdentificationService;
