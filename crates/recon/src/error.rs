use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no countries, duplicate names, blank columns).
    ConfigValidation(String),
    /// A country name that is not declared in the config.
    UnknownCountry(String),
    /// Required columns absent from a country's table.
    MissingColumns { country: String, columns: Vec<String> },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownCountry(name) => write!(f, "unknown country: {name}"),
            Self::MissingColumns { country, columns } => {
                write!(f, "country '{country}': missing column(s): {}", columns.join(", "))
            }
        }
    }
}

impl std::error::Error for ReconError {}
