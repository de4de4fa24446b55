pub mod ttl;

mod macros;

pub use ttl::CacheKey;
pub use ttl::SweeperHandle;
pub use ttl::TtlCache;
