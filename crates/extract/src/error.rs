use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("report root {0:?} does not exist or is not a directory")]
    RootNotFound(PathBuf),

    #[error("folder name {0:?} does not match <name>_<YYYY>-<MM>-<DD>_<HH>-<MM>")]
    IdentityParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
