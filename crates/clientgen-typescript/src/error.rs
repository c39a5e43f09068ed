use clientgen_core::error::GenerateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeScriptError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
