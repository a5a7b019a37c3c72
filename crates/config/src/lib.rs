// Configuration loading

pub mod ai;
pub mod settings;

pub use ai::{
    get_api_key, keychain_available, KeyLookup, KeySource, OracleDiagnostics,
    OracleOverrides, OracleStatus, ResolvedOracleConfig,
};
pub use settings::{OracleProvider, OracleSettings, Settings};
