pub(crate) use combine::Combine;
pub(crate) use completions::Completions;
pub(crate) use config::Config;
pub(crate) use init::Init;
pub(crate) use normalize::Normalize;
pub(crate) use status::Status;
pub(crate) use version::Version;

mod combine;
mod completions;
mod config;
mod init;
mod normalize;
mod status;
mod version;
