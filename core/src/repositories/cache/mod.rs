pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::MemoryCacheEngine;
pub use r#trait::{remove_matching, slice_bounds, CacheEngine};

#[cfg(test)]
mod tests;
