//! Route Configuration Module
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports
//! └── router.rs       - Router assembly and the health handler
//! ```

/// Main router creation
pub mod router;

pub use router::create_router;
