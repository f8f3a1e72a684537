use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("node error: {0}")]
    Node(#[from] node::NodeError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
