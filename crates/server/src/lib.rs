#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod handler;
pub mod origin;
pub mod routes;
pub mod server;
pub mod view;

pub use config::Config;
pub use error::Error;
pub use generator::{FragmentGenerator, GenerationError, Generator};
pub use handler::DocRequestHandler;
pub use view::{HandlebarsRenderer, TemplateRenderer};
