//! Pipeline builder
//!
//! Accumulates middleware during single-threaded startup. Registration
//! methods return the same `&mut` handle so configuration calls chain;
//! validation failures abort the call before anything is registered.

use crate::middleware::{Middleware, Pipeline};
use std::sync::Arc;

/// Builder accumulating an ordered middleware chain
#[derive(Default)]
pub struct PipelineBuilder {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a middleware at the end of the chain
    pub fn add(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        tracing::debug!("Registered middleware: {}", middleware.name());
        self.middleware.push(middleware);
        self
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Freeze the chain into a dispatchable pipeline
    pub fn build(&self) -> Pipeline {
        Pipeline::new(self.middleware.clone())
    }
}
