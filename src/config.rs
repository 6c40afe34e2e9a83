//! Runtime configuration gathered from flags and the environment.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::ai::DEFAULT_MODEL;
use crate::logging::{DEFAULT_FILTER, LOG_ENV};

/// Environment variables searched, in order, for the Gemini API key.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub log_filter: String,
}

impl Config {
    /// Resolve configuration from the optional flag values and the process
    /// environment.
    pub fn resolve(data_dir: Option<PathBuf>, model: Option<String>) -> Self {
        Self::resolve_with(data_dir, model, |k| env::var(k).ok())
    }

    /// Same as [`Config::resolve`] with an injectable environment lookup.
    pub fn resolve_with<F>(data_dir: Option<PathBuf>, model: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let data_dir = data_dir.unwrap_or_else(|| {
            let home = non_empty("HOME").unwrap_or_else(|| ".".to_string());
            PathBuf::from(home).join(".mewfocus")
        });
        Config {
            data_dir,
            api_key: API_KEY_VARS.iter().find_map(|k| non_empty(*k)),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            log_filter: non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_come_from_home() {
        let cfg = Config::resolve_with(None, None, env_of(&[("HOME", "/home/lea")]));
        assert_eq!(cfg.data_dir, PathBuf::from("/home/lea/.mewfocus"));
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.log_filter, "warn");
    }

    #[test]
    fn api_key_prefers_gemini_variable() {
        let both = env_of(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]);
        assert_eq!(Config::resolve_with(None, None, both).api_key.as_deref(), Some("g"));

        let fallback = env_of(&[("GEMINI_API_KEY", " "), ("API_KEY", "a")]);
        assert_eq!(Config::resolve_with(None, None, fallback).api_key.as_deref(), Some("a"));
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::resolve_with(
            Some(PathBuf::from("/tmp/mf")),
            Some("gemini-pro".into()),
            env_of(&[("MEWFOCUS_LOG", "mewfocus=debug")]),
        );
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/mf"));
        assert_eq!(cfg.model, "gemini-pro");
        assert_eq!(cfg.log_filter, "mewfocus=debug");
    }

    #[test]
    fn ensure_data_dir_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::resolve_with(Some(dir.path().join("a/b")), None, env_of(&[]));
        cfg.ensure_data_dir().unwrap();
        assert!(cfg.data_dir.is_dir());
    }
}
