//! A hierarchical router tree kept in sync with a serialized location.
//!
//! Routers are declared as a tree; each has a template type (`scene`,
//! `stack`, `data`, `feature` or a custom one) that decides how its actions
//! edit the location and how its state is read back from it. The location
//! (`/pathname?search`) is the single source of truth: actions produce a new
//! location, it is committed to a [`store::LocationStore`], and every
//! router's [`store::RouterState`] is re-derived from what was committed.
//!
//! ```no_run
//! use std::sync::Arc;
//! use router_sync::store::{MemoryLocationStore, RouterStateStore};
//! use router_sync::{Manager, RouterDeclaration};
//!
//! let tree = RouterDeclaration::new("root")
//!     .child("scene", RouterDeclaration::new("home"))
//!     .child("scene", RouterDeclaration::new("settings"));
//! let manager = Manager::new(
//!     &tree,
//!     Arc::new(MemoryLocationStore::default()),
//!     Arc::new(RouterStateStore::default()),
//! )?;
//! manager.router("settings")?.show()?;
//! assert_eq!(manager.serialized_location(), "/settings");
//! # Ok::<(), router_sync::RouterError>(())
//! ```

pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod manager;
pub mod store;
pub mod templates;
pub mod tree;

pub use error::{Result, RouterError};
pub use location::{Location, SearchValue};
pub use manager::{ActionScope, Manager, RouterHandle};
pub use store::{RouterState, StateRecord};
pub use templates::{ActionOptions, TemplateKind};
pub use tree::{RouterDeclaration, RouterNode};
