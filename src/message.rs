use std::path::PathBuf;

use crate::thumbnail::WarmError;

pub enum FromWorker {
    Started(usize),
    Processed(PathBuf, Result<(), WarmError>),
    Stopped(usize),
}
