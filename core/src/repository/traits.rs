use crate::error::TrackerResult;

/// String-valued key-value storage. Each collection of the tracker lives
/// under its own fixed key and is rewritten whole on every change.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> TrackerResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        (**self).set(key, value)
    }
}
