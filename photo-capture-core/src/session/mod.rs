pub mod capture_session;
pub mod continuation;
pub(crate) mod delivery;
pub mod device_registry;
pub mod flash;
pub(crate) mod hardware;
pub mod pipeline;
pub mod preview;
pub(crate) mod queue;
