pub mod nearest;
pub mod policy;

use bevy_ecs::prelude::Resource;

pub use nearest::NearestMatching;
pub use policy::{is_carpool_eligible, nearest_by, MatchingPolicy};

/// Resource wrapper for the matching policy trait object.
#[derive(Resource)]
pub struct MatchingPolicyResource(pub Box<dyn MatchingPolicy>);

impl MatchingPolicyResource {
    pub fn new(policy: Box<dyn MatchingPolicy>) -> Self {
        Self(policy)
    }
}

impl Default for MatchingPolicyResource {
    fn default() -> Self {
        Self::new(Box::new(NearestMatching))
    }
}

impl std::ops::Deref for MatchingPolicyResource {
    type Target = dyn MatchingPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
