pub mod aggregate;

pub use aggregate::{Bundle, BundleId, BundleWithMembers};
