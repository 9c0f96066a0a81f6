// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Abscissa is not strictly increasing: {0}")]
    NonMonotone(String),

    #[error("Periodic interpolation over non-periodic data: {0}")]
    NonPeriodic(String),

    #[error("Not enough points for {variant}: required {required}, got {got}")]
    InsufficientPoints {
        variant: &'static str,
        required: usize,
        got: usize,
    },

    #[error("Unknown interpolation selector: '{0}'")]
    UnknownInterpolation(String),

    #[error("Query {value} outside interpolation domain [{min}, {max}]")]
    DomainError { value: f64, min: f64, max: f64 },

    #[error("Array shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OrbitResult<T> = Result<T, OrbitError>;
