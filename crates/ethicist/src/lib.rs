//! ethicist - ethical analysis for AI systems over MCP
//!
//! Five LLM-backed analysis tools, a JSON knowledge base of ethical and
//! responsible-AI frameworks exposed as resources, and three structured
//! prompt templates. [`service::Ethicist`] is the entry point; it
//! implements [`baton::Handler`] so any baton transport can serve it.
//!
//! ```rust,ignore
//! let config = ethicist::config::EthicistConfig::load()?;
//! let service = std::sync::Arc::new(ethicist::Ethicist::from_config(&config.llm)?);
//! baton::serve_stdio(service).await?;
//! ```

pub mod composer;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod handler;
pub mod knowledge;
pub mod prompts;
pub mod registry;
pub mod resources;
pub mod serve;
pub mod service;
pub mod telemetry;

pub use dispatch::ToolOutcome;
pub use service::Ethicist;
