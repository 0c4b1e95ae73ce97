//! # evefsd
//!
//! Extraction of EVE Frontier client data into a working tree of links and
//! JSON documents.
//!
//! This library provides functionality to:
//! - Validate a game installation and lay out the working tree
//! - Scan the resource index and link every resource by file type
//! - Convert pickles and SQLite databases to JSON
//! - Hand `fsdbinary` files to an external decoder
//! - Build type name, blueprint and stellar name datasets from the JSON
//!
//! ## Example
//!
//! ```no_run
//! use evefsd::{Installation, PythonPickleConverter, RouteOptions, Router, RunStats, Workspace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let install = Installation::resolve("/games/EVE Frontier".as_ref(), "stillness")?;
//! let workspace = Workspace::new("out");
//! workspace.ensure_directories()?;
//!
//! let pickles = PythonPickleConverter::default();
//! let router = Router::new(&workspace, &pickles, RouteOptions::default());
//! let mut stats = RunStats::new();
//! evefsd::scan_manifest(&install.manifest(), install.resource_root(), &router, &mut stats)?;
//!
//! println!("{}", stats.summary().render());
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod cleanup;
pub mod convert;
pub mod decode;
pub mod derive;
pub mod error;
pub mod index;
pub mod install;
pub mod router;
pub mod stats;
pub mod symlink;
pub mod workspace;

#[doc(inline)]
pub use classify::{classify, Classification, FileType};
#[doc(inline)]
pub use convert::{ObjectConverter, PythonPickleConverter};
#[doc(inline)]
pub use decode::{BinaryDecoder, ProcessDecoder, PythonLoaderDecoder};
#[doc(inline)]
pub use error::{PipelineError, Result};
#[doc(inline)]
pub use index::{scan_manifest, EntryHandler, IndexEntry, ManifestReader};
#[doc(inline)]
pub use install::Installation;
#[doc(inline)]
pub use router::{RouteOptions, Router};
#[doc(inline)]
pub use stats::{RunStats, StatsSummary};
#[doc(inline)]
pub use workspace::Workspace;
