use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while generating type definitions
#[derive(Error, Debug)]
pub enum SchematsError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Metadata query against schema '{schema}' failed: {message}")]
    Introspection { schema: String, message: String },

    #[error("Rendering TypeScript for '{table}' failed: {message}")]
    CodeGen { table: String, message: String },

    #[error("Could not write type definitions to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
