/// Local key value persistence. Implementations swallow their own failures:
/// a failed read is reported as absent, a failed write is logged and dropped.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);
}

pub type StorageBox = Box<dyn Storage + Send + Sync>;

/// Storage key holding the last selected configuration profile.
pub const PROFILE_KEY: &str = "profile";
