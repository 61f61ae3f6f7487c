//! Principal display-name resolution
//!
//! Role assignments and access policies name principals by object ID only.
//! [`PrincipalNameResolver`] turns those IDs into labels and remembers every
//! answer for the rest of the run, including the fallback of using the ID
//! itself when no directory lookup knows it.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use azgraph_collector::principal::PrincipalNameResolver;
//! use azgraph_collector::gateway::commands;
//! use azgraph_core::testing::ScriptedGateway;
//!
//! let gateway = Arc::new(ScriptedGateway::new());
//! gateway.on_text(&commands::user_display_name("p1"), "alice");
//!
//! let resolver = PrincipalNameResolver::new(gateway.clone());
//! let names = resolver.resolve(&["p1".to_string(), "p2".to_string()]);
//!
//! assert_eq!(names["p1"], "alice");
//! assert_eq!(names["p2"], "p2");
//! ```

mod resolver;


pub use resolver::{PrincipalNameResolver, ResolverStats, DEFAULT_BATCH_SIZE};
