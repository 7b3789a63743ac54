pub mod router;
pub mod steps;

pub use router::resource;
pub use steps::ResourceContext;
