pub mod event;
pub mod github;
pub mod outputs;
pub mod process;
