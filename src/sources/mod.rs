//! Content providers this pipeline knows how to ingest.

pub mod guardian;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    TheGuardian,
}

impl Source {
    /// Tag stored on every article of this provider.
    pub fn tag(&self) -> &'static str {
        match self {
            Source::TheGuardian => "the-guardian",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Source::TheGuardian => guardian::API_URL,
        }
    }
}
