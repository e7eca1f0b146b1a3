//! Indoor positioning: building frames, zones and points of interest.

mod frame;
mod provider;
mod zones;

pub use frame::{global_to_local, is_within_bounds, local_to_global};
pub use provider::{IndoorFrameCache, IndoorProvider, IndoorSnapshot, StaticIndoorProvider};
pub use zones::{find_zone, nearest_poi, nearest_poi_distance, search_pois};
