//! The closed set of stores a record can live in.

use crate::libs::config::Config;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a record comes from.
///
/// There are exactly two stores and the sync client switches on this enum
/// explicitly wherever the stores differ, so that error mapping stays
/// exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The embedded SQLite store on this machine.
    Local,
    /// The remote cloud store.
    Remote,
}

impl Source {
    /// Whether fetching from this store needs a network connection.
    pub fn requires_internet(&self) -> bool {
        match self {
            Source::Local => false,
            Source::Remote => true,
        }
    }

    /// Whether the user has this store enabled.
    ///
    /// The local store is always available; the remote store only when it is
    /// configured and not switched off by the user.
    pub fn is_enabled(&self, config: &Config) -> bool {
        match self {
            Source::Local => true,
            Source::Remote => config.remote.as_ref().map(|remote| remote.enabled).unwrap_or(false),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local => write!(f, "local"),
            Source::Remote => write!(f, "remote"),
        }
    }
}
