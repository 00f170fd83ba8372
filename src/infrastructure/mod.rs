//! Infrastructure layer - Storage, imaging and classifier implementations

pub mod classifier;
pub mod imaging;
pub mod logging;
pub mod prediction;
pub mod storage;
pub mod user;
