//! Autobuild - incremental rebuild planner.
//!
//! Given two snapshots of a package collection (for instance the published
//! binary repository and the current source tree), autobuild works out which
//! packages changed, checks their build dependencies and computes the order
//! they have to be built in. The CLI can then submit that order to a build
//! server.
//!
//! ```no_run
//! use autobuild::plan::{PlanOptions, Planner};
//! use autobuild::snapshot::{self, Snapshot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let old = snapshot::load("repo:/srv/repo/eopkg-index.xml")?;
//! let new = snapshot::load("src:/home/build/packages")?;
//!
//! let plan = Planner::new(old.as_ref(), new.as_ref()).plan(&PlanOptions::default())?;
//! for position in plan.order() {
//!     println!("{}", new.name_at(position).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod deps;
pub mod diff;
pub mod domain;
pub mod error;
pub mod plan;
pub mod publish;
pub mod snapshot;

// Public CLI module (needed by binary)
pub mod cli;
pub mod config;
pub mod output;

pub use autobuild_graph::Position;
