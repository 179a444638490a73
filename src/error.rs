#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config: {0}")]
    Config(String),

    #[error("document store: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("graph store: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("decode {column}: {message}")]
    Decode { column: String, message: String },

    #[error("unknown catalogue entry `{0}`")]
    UnknownEntry(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
