pub(crate) use crate::config::Config;
pub(crate) use crate::error::{bail, ClaimsetError, ClaimsetResult};
pub(crate) use crate::progress::ProgressBarBuilder;
pub(crate) use crate::project::Project;
