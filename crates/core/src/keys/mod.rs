mod codec;
mod error;
mod schema;

pub use codec::{
    compose_key, compose_key_prefix, compose_key_strictly, destruct_key, destruct_key_tail,
    has_discriminator, Composed, DELIMITER,
};
pub use error::{KeyError, SchemaError};
pub use schema::{
    field_matches, merge_field, ComposeFn, DestructFn, KeyAttr, KeyFields, KeySchema, KeySlot,
};
