#![deny(
    // The following are allowed by default lints according to
    // https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html
    absolute_paths_not_starting_with_crate,
    explicit_outlives_requirements,
    macro_use_extern_crate,
    anonymous_parameters,
    bare_trait_objects,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unstable_features,
    unused_extern_crates,
    unused_import_braces,
)]
#![warn(
    unreachable_pub,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    clippy::all,
    clippy::pedantic,
)]
#![allow(
    // Some explicitly allowed Clippy lints, must have clear reason to allow
    clippy::implicit_return, // actually omitting the return keyword is idiomatic Rust code
    clippy::module_name_repetitions, // repeation of module name in a struct name is not big deal
    clippy::missing_panics_doc, // only the `Config` setters assert
    clippy::shadow_same, // Not too much bad
    clippy::shadow_reuse, // Not too much bad
)]
//! Non-blocking containers for multi-producer / multi-consumer use.
//!
//! - [`MsQueue`](queue::michael_scott::MsQueue): Michael-Scott FIFO with a dummy head and a
//!   cooperatively advanced tail.
//! - [`TwoPointerQueue`](queue::two_pointer::TwoPointerQueue): FIFO that swings the tail first and
//!   links the predecessor afterwards.
//! - [`LockFreeVector`](vector::LockFreeVector): indexed sequence replaced as a whole by CAS.
//!
//! Removed nodes and replaced arrays are retired through `crossbeam-epoch`, so no pointer CAS in
//! this crate can succeed against recycled memory.

/// Common traits and impl.
pub mod common;

/// Configuration for the containers.
pub mod config;

/// Lock-free FIFO queues.
pub mod queue;

/// Copy-on-write indexed sequence.
pub mod vector;

pub use common::{Queue, Vector};
pub use config::Config;
pub use queue::michael_scott::MsQueue;
pub use queue::two_pointer::TwoPointerQueue;
pub use vector::LockFreeVector;
