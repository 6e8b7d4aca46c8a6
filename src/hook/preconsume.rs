//! Pre-consumption script environment

use super::vars::HookVars;
use serde::Serialize;
use std::path::PathBuf;

pub const ENV_DOCUMENT_SOURCE_PATH: &str = "DOCUMENT_SOURCE_PATH";
pub const ENV_DOCUMENT_WORKING_PATH: &str = "DOCUMENT_WORKING_PATH";

/// Paths handed to a pre-consumption script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreConsume {
    /// Where the consumed document was found
    pub document_source_path: Option<PathBuf>,
    /// Copy of the original the consumption works on; a script may modify it
    pub document_working_path: Option<PathBuf>,
}

impl PreConsume {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = HookVars::new(lookup, None);

        Self {
            document_source_path: vars.path(ENV_DOCUMENT_SOURCE_PATH),
            document_working_path: vars.path(ENV_DOCUMENT_WORKING_PATH),
        }
    }
}
