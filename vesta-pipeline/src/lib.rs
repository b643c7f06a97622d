//! Vesta Middleware Pipeline
//!
//! An ordered chain of request-handling components over `http` types, with
//! a builder for registration-time configuration. The static file
//! middleware and its registration entry points live here.

mod builder;
mod middleware;
mod static_files;

pub use builder::PipelineBuilder;
pub use middleware::{Middleware, Pipeline, Request, Response};
pub use static_files::StaticFileMiddleware;
