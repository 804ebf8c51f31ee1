//! Provider implementations.

#[cfg(feature = "memory")]
pub mod memory;

/// Registers all compiled providers with the factory.
///
/// Called through [`crate::init`]; safe to call more than once.
pub fn register_all() {
    #[cfg(feature = "memory")]
    memory::register();
}
