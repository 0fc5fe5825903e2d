//! Security validation: path containment and pre-extraction screening.

pub mod inspector;
pub mod path_guard;

pub use inspector::SecurityProfile;
pub use inspector::enforce;
pub use inspector::inspect;
pub use path_guard::PathGuard;
pub use path_guard::sanitize_name;
