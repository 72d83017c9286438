//! Error taxonomy for the search engine.
//!
//! See spec.md §7. Infeasibility (an empty result stream) is deliberately
//! *not* a variant here — it is a normal, successful outcome that the driver
//! surfaces as zero items, never as an `Err`.

/// Catalog or query input that cannot be validated into a well-formed
/// search. Surfaced to the caller; no partial work is retained.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("malformed catalog row in {file}: {reason}")]
    MalformedRow { file: &'static str, reason: String },

    #[error("query references unknown skill id {0}")]
    UnknownSkill(crate::SkillId),

    #[error("catalog declares torso_up skill id {0} which does not exist")]
    UnknownTorsoUp(crate::SkillId),

    #[error("max_results must be positive, got {0}")]
    NonPositiveMaxResults(i64),

    #[error("query requests {0} effects, but a signature can only track {1}")]
    TooManyEffects(usize, usize),

    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A node pool id or snapshot id that does not correspond to anything live.
/// Always a programming error in the driver; there is no recovery.
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    #[error("OR-node id {0} is out of range (pool has {1} entries)")]
    InvalidOrId(usize, usize),

    #[error("AND-node id {0} is out of range (pool has {1} entries)")]
    InvalidAndId(usize, usize),

    #[error("snapshot id {0} does not correspond to a pushed snapshot")]
    InvalidSnapshot(usize),
}

/// Top-level error type threaded through the pipeline and search driver.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("signature arithmetic overflowed for skill slot {slot} (value {value})")]
    SignatureOverflow { slot: usize, value: i64 },
}

pub type Result<T> = std::result::Result<T, SearchError>;
