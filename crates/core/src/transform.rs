//! Transform engine.
//!
//! A [`Transformer`] turns a static [`KeySchema`] plus the entity's non-key attribute type
//! into the four operations every entity module needs: composing a point-lookup key,
//! flattening an entity into a stored record, rebuilding an entity from a record, and
//! testing whether a raw record belongs to the entity at all.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::EntityKind;
use crate::keys::{Composed, KeyAttr, KeyError, KeyFields, KeySchema, DELIMITER};
use crate::storage::{record_str, FlatRecord};

/// Errors raised while converting between entities and stored records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("{entity}: non-key attributes must serialize to an object")]
    AttrsNotObject { entity: &'static str },
    #[error("{entity}: non-key attribute {name} collides with a key attribute")]
    ReservedAttr { entity: &'static str, name: String },
    #[error("{entity}: cannot serialize attributes: {message}")]
    Serialize {
        entity: &'static str,
        message: String,
    },
    #[error("{entity}: cannot deserialize attributes: {message}")]
    Deserialize {
        entity: &'static str,
        message: String,
    },
}

/// A structured entity: its key fields and its non-key attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<K, A> {
    pub keys: K,
    pub attrs: A,
}

impl<K, A> Entity<K, A> {
    pub fn new(keys: K, attrs: A) -> Self {
        Self { keys, attrs }
    }
}

/// Key schema bound to an entity's attribute type.
pub struct Transformer<K, A> {
    kind: EntityKind,
    schema: KeySchema<K>,
    primary: &'static [KeyAttr],
    _attrs: PhantomData<fn() -> A>,
}

impl<K, A> Transformer<K, A> {
    pub const fn new(kind: EntityKind, schema: KeySchema<K>, primary: &'static [KeyAttr]) -> Self {
        Self {
            kind,
            schema,
            primary,
            _attrs: PhantomData,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn schema(&self) -> &KeySchema<K> {
        &self.schema
    }

    /// Attributes that make up the item's unique key.
    pub fn primary(&self) -> &'static [KeyAttr] {
        self.primary
    }
}

impl<K, A> Transformer<K, A>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
{
    /// Compose one attribute from (possibly partial) key fields.
    pub fn compose(&self, attr: KeyAttr, keys: &K) -> Option<Composed> {
        self.schema.slot(attr).and_then(|slot| (slot.compose)(keys))
    }

    /// Build the primary key for a point get or delete.
    ///
    /// Fails with [`KeyError::Incomplete`] if any primary attribute cannot be composed in
    /// full from `keys`.
    pub fn key(&self, keys: &K) -> Result<FlatRecord, TransformError> {
        check_identifiers(keys)?;

        let mut record = FlatRecord::new();
        for attr in self.primary {
            let value = self
                .compose(*attr, keys)
                .and_then(Composed::into_full)
                .ok_or(KeyError::Incomplete {
                    entity: self.kind.as_str(),
                    attr: *attr,
                })?;
            record.insert(attr.name().to_string(), Value::String(value));
        }
        Ok(record)
    }

    /// Flatten an entity into the record to store.
    ///
    /// Secondary attributes that do not compose to a complete key are left out entirely,
    /// as are null non-key attributes.
    pub fn item_to_attrs(&self, item: &Entity<K, A>) -> Result<FlatRecord, TransformError> {
        let entity = self.kind.as_str();
        let mut record = self.key(&item.keys)?;

        for attr in self.schema.keys_used() {
            if record.contains_key(attr.name()) {
                continue;
            }
            if let Some(value) = self
                .compose(attr, &item.keys)
                .and_then(Composed::into_full)
            {
                record.insert(attr.name().to_string(), Value::String(value));
            }
        }

        let attrs = serde_json::to_value(&item.attrs).map_err(|e| TransformError::Serialize {
            entity,
            message: e.to_string(),
        })?;
        let Value::Object(attrs) = attrs else {
            return Err(TransformError::AttrsNotObject { entity });
        };

        for (name, value) in attrs {
            if KeyAttr::is_key_attribute(&name) {
                return Err(TransformError::ReservedAttr { entity, name });
            }
            if value.is_null() {
                continue;
            }
            record.insert(name, value);
        }

        Ok(record)
    }

    /// Rebuild an entity from a stored record.
    ///
    /// Key fields come from destructing the key attributes; unrecognized key strings
    /// leave the corresponding fields empty. Everything else is read as non-key
    /// attributes, except nulls, which are treated as absent.
    pub fn attrs_to_item(&self, record: &FlatRecord) -> Result<Entity<K, A>, TransformError> {
        let keys = self.destruct(record);

        let attrs: Map<String, Value> = record
            .iter()
            .filter(|(name, value)| !KeyAttr::is_key_attribute(name) && !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let attrs =
            serde_json::from_value(Value::Object(attrs)).map_err(|e| TransformError::Deserialize {
                entity: self.kind.as_str(),
                message: e.to_string(),
            })?;

        Ok(Entity { keys, attrs })
    }

    /// Recover every key field the record's key attributes carry.
    pub fn destruct(&self, record: &FlatRecord) -> K {
        let mut keys = K::default();
        for attr in self.schema.keys_used() {
            let Some(destruct) = self.schema.slot(attr).and_then(|slot| slot.destruct) else {
                continue;
            };
            let Some(raw) = record_str(record, attr) else {
                continue;
            };
            if let Some(fields) = destruct(raw) {
                keys.merge(fields);
            }
        }
        keys
    }

    /// Returns true if the record's primary key belongs to this entity and carries the
    /// expected field values.
    ///
    /// Every destructed attribute must compose back to exactly the stored string.
    ///
    /// Slots without a `destruct` are constant tokens and are compared against the
    /// value composed from `expected`.
    pub fn is_key_value_matching(&self, record: &FlatRecord, expected: &K) -> bool {
        let mut keys = K::default();

        for attr in self.primary {
            let Some(slot) = self.schema.slot(*attr) else {
                return false;
            };
            let Some(raw) = record_str(record, *attr) else {
                return false;
            };

            match slot.destruct {
                Some(destruct) => {
                    let Some(fields) = destruct(raw) else {
                        return false;
                    };
                    // Bare discriminators and truncated keys do not recompose to `raw`.
                    let recomposed = (slot.compose)(&fields).and_then(Composed::into_full);
                    if recomposed.as_deref() != Some(raw) {
                        return false;
                    }
                    keys.merge(fields);
                }
                None => {
                    let token = (slot.compose)(expected).and_then(Composed::into_full);
                    if token.as_deref() != Some(raw) {
                        return false;
                    }
                }
            }
        }

        keys.matches(expected)
    }

    /// Returns true if the record's primary key has this entity's shape.
    pub fn is_record_type_matching(&self, record: &FlatRecord) -> bool {
        self.is_key_value_matching(record, &K::default())
    }
}

/// Rejects identifier fields containing the key delimiter.
pub fn check_identifiers<K: KeyFields>(keys: &K) -> Result<(), KeyError> {
    for (field, value) in keys.identifiers() {
        if value.contains(DELIMITER) {
            return Err(KeyError::DelimiterInValue {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
