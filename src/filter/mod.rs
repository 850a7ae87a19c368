//! r.js optimizer filter
//!
//! Bridges an asset pipeline to the RequireJS optimizer: [`FilterConfig`]
//! accumulates the build knobs, [`ProfileBuilder`] turns them into a build
//! profile for one asset, and [`RjsFilter`] runs the optimizer and recovers
//! its output.

pub mod asset;
pub mod config;
pub mod error;
pub mod invoker;
pub mod profile;

pub use asset::{Asset, SourceAsset};
pub use config::{FilterConfig, ModuleDescriptor, ShimConfig, ShimDescriptor};
pub use error::OptimizeError;
pub use invoker::{OptimizerCommand, RjsFilter};
pub use profile::{entry_point_name, BuildProfile, ProfileBuilder};

/// Capability of transforming an asset on its way into and out of a pipeline.
pub trait Filter {
    /// Called when the asset is loaded. Does nothing by default.
    fn filter_load(&self, _asset: &mut dyn Asset) -> Result<(), OptimizeError> {
        Ok(())
    }

    /// Called when the asset is dumped
    fn filter_dump(&self, asset: &mut dyn Asset) -> Result<(), OptimizeError>;
}
