//! Koyomi availability engine - integration test support.
//!
//! This crate re-exports the workspace crates to support integration
//! tests that use `koyomi::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use koyomi_core::*;
    pub use koyomi_service::*;

    // Both crates export an `error` module; name the service error types
    // directly so test code has an unambiguous path
    pub use koyomi_core::error::{CoreError, CoreResult};
    pub use koyomi_service::error::{ServiceError, ServiceResult};

    // Re-export the store crate with its public modules
    pub mod store {
        pub use koyomi_store::error::*;
        pub use koyomi_store::store::*;
    }

    // Re-export models
    pub mod model {
        pub use koyomi_store::model::*;
    }
}

pub use koyomi_slot as slot;
