pub mod process;
pub mod thread_store;

pub use process::{ProcessOutput, ProcessRunner};
pub use thread_store::ThreadStore;
