//! # Buildwise Catalog
//!
//! Normalized, read-only view over a raw hardware part catalog.
//!
//! ## Architecture
//!
//! ```text
//! raw JSON records
//!     │
//!     ├──> Normalizer
//!     │      ├─ coerce price / performance / performanceScore to numbers
//!     │      ├─ derive normalized category / part / type labels
//!     │      └─ default socket and ramType to empty
//!     │
//!     ├──> Catalog (immutable, shared across strategy runs)
//!     │
//!     ├──> Category Resolver
//!     │      ├─ exact normalized-category match
//!     │      └─ alias fallback on the secondary label column
//!     │
//!     └──> Filters
//!            ├─ integrated-GPU exclusion (regex token set)
//!            └─ try_restrict (soft restriction, no-op when nothing matches)
//! ```

mod error;
mod filter;
mod normalize;
mod resolve;
mod types;

pub use error::{CatalogError, Result};
pub use filter::{try_restrict, IntegratedGpuFilter};
pub use normalize::{normalize_label, normalize_token, Catalog, SecondaryColumn};
pub use resolve::AliasMap;
pub use types::{PartKind, PartRecord, RamType, PLACEHOLDER_NAME};
