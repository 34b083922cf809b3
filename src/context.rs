use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{ProcessRunner, ThreadStore};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub process_runner: Arc<dyn ProcessRunner>,
    pub thread_store: Arc<dyn ThreadStore>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        process_runner: Arc<dyn ProcessRunner>,
        thread_store: Arc<dyn ThreadStore>,
    ) -> Self {
        Self {
            config,
            process_runner,
            thread_store,
        }
    }
}
