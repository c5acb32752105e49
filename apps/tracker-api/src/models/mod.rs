pub mod global_marker;
pub mod instance_marker;
pub mod model_marker;

pub use global_marker::GlobalMarker;
pub use instance_marker::InstanceMarker;
pub use model_marker::ModelMarker;

/// Marker granularity, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Global,
    Model,
    Instance,
}

impl Tier {
    pub const COARSEST_FIRST: [Tier; 3] = [Tier::Global, Tier::Model, Tier::Instance];
}
