pub mod backends;
pub mod storage;
