//! A thin, testable facade over a Docker-compatible container engine.
//!
//! `container-wrapper` exposes two small capabilities on top of `bollard`:
//!
//! - [`engine::Engine`], the facade for one engine connection, which pulls
//!   images, creates containers and removes containers by identifier.
//! - [`engine::Container`], the handle returned by a successful create, which
//!   starts, stops and removes that one container.
//!
//! Both are reached through traits ([`engine::ContainerEngine`] and
//! [`engine::ContainerHandle`]) so callers can substitute doubles, and all
//! engine traffic passes through the [`engine::EngineApi`] seam. Nothing is
//! retried, cached or reconciled: every operation is one engine request and
//! the engine's own error is kept as the source of the reported failure.
//!
//! # Modules
//!
//! - [`config`]: Connection settings with layered loading (env > file > defaults)
//! - [`engine`]: Engine facade, container handles and the engine client seam
//! - [`error`]: Semantic error types for the crate

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{
    Container, ContainerEngine, ContainerHandle, CreateContainerInput, Engine, EnvVars,
    PortMappings,
};
pub use error::{ContainerError, Result, WrapperError};
