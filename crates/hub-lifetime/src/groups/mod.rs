//! Group management
//!
//! Named connection groups used for scoped broadcast.

mod group;
mod registry;

pub use group::Group;
pub use registry::GroupRegistry;
