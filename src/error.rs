use thiserror::Error;

pub type Result<T> = std::result::Result<T, TeamweekError>;

#[derive(Error, Debug)]
pub enum TeamweekError {
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Git command failed: {0}")]
    GitCommand(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No wage rate configured for author '{0}'")]
    MissingWage(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

// Manual From implementations for unboxed to boxed gix errors
impl From<gix::object::commit::Error> for TeamweekError {
    fn from(err: gix::object::commit::Error) -> Self {
        TeamweekError::Commit(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for TeamweekError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        TeamweekError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for TeamweekError {
    fn from(err: gix::objs::decode::Error) -> Self {
        TeamweekError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for TeamweekError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        TeamweekError::DiffTreeToTree(Box::new(err))
    }
}

impl From<gix::discover::Error> for TeamweekError {
    fn from(err: gix::discover::Error) -> Self {
        TeamweekError::GitDiscover(Box::new(err))
    }
}
