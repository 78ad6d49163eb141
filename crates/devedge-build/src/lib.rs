//! # devedge-build
//!
//! Rebuild orchestration for the devedge development server.
//!
//! The bundler itself is an external collaborator hidden behind the
//! [`Bundler`] trait. This crate owns everything around it:
//!
//! - [`BuildTarget`] - one compilation unit (entry points, output, flags)
//! - [`Metafile`] / [`BuildStats`] - size accounting derived from the bundler's metafile
//! - [`BuildError`] - structured, serializable failure detail
//! - [`BuildOrchestrator`] - serialized rebuilds with a monotonically increasing generation
//!
//! ## Quick Start
//!
//! ```no_run
//! use devedge_build::{BuildOrchestrator, BuildTarget, BuildTrigger, EsbuildBundler};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bundler = EsbuildBundler::new("esbuild", ".");
//! let mut orchestrator =
//!     BuildOrchestrator::new(bundler, vec![BuildTarget::default()], "node_modules");
//!
//! let stats = orchestrator.rebuild(&BuildTrigger::startup()).await?;
//! println!("wrote {:?}", stats.output_files);
//! # Ok(()) }
//! ```

pub mod bundler;
pub mod error;
pub mod metafile;
pub mod orchestrator;
pub mod target;

pub use bundler::{Bundler, EsbuildBundler};
pub use error::{BuildError, BuildMessage, Location};
pub use metafile::{BuildStats, Metafile, MetafileEntry, format_size};
pub use orchestrator::{BuildHandle, BuildOrchestrator, BuildStatus, BuildTrigger, TriggerKind};
pub use target::{BuildTarget, Format, Platform};
