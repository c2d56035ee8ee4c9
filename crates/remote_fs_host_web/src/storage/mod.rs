//! Browser preference storage.

pub mod local_prefs;
