// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::must_use_candidate
    )
)]

pub mod config;
pub mod git;
pub mod identity;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use config::{
    decode_config, default_config_paths, encode, encode_config, read_config, sort_identities,
    write_config, Condition, ConditionMode, Config, ConfigError, Format, Identity, LoadedConfig,
    Match, MatchList,
};
pub use git::{CommandRunner, ConfigScope, ConfigStore, GitCli, GitError, GitInfo, Remote};
pub use identity::{
    apply_identity_as_args, first_auto_matching_identity, IdentityError, IdentityManager,
    MatchContext,
};
