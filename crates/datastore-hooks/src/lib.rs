//! # Data Store Hooks
//!
//! A name-keyed filter dispatcher. Callbacks registered under a hook name
//! are folded over a value, in priority then registration order, whenever
//! the hook is invoked.
//!
//! ## Usage
//!
//! ```rust
//! use datastore_hooks::HookDispatcher;
//!
//! let hooks = HookDispatcher::new();
//! hooks.register("greeting", |s: String| format!("{s}, world"));
//!
//! assert_eq!(hooks.invoke("greeting", String::from("hello")), "hello, world");
//! assert_eq!(hooks.invoke("unused", 5_u32), 5);
//! ```
//!
//! ## Design Notes
//!
//! - **Explicit object**: the dispatcher is passed around, not global. Clones
//!   share the same registry.
//! - **Typed callbacks**: a hook name may only meaningfully carry one value
//!   type. Callbacks registered for another type are skipped at invoke time.
//! - **Generations**: every registration or clear bumps a per-name counter,
//!   which callers can use to invalidate anything derived from a hook.

pub mod dispatcher;

pub use dispatcher::{HookDispatcher, DEFAULT_PRIORITY};
