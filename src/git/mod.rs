pub mod repo;
pub mod sync;

pub use repo::GitRepo;
pub use sync::{clone_or_pull, clone_url, local_path};
