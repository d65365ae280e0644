mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{country_lookup_key, user_profile_key};
pub use serialization::{deserialize_value, get_json, serialize_value, set_json};
pub use traits::Cache;
