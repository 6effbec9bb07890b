mod indexed_map;
mod rand_map;
mod random_source;

pub use indexed_map::IndexedMap;
pub use rand_map::RandMap;
pub use random_source::{RandomSource, SmallRngSource, ThreadRngSource};
