//! Key schema descriptors.
//!
//! A [`KeySchema`] declares, for each of the nine physical key attributes, which entity
//! fields feed it and how to compose and destruct its string value. Slots are looked up
//! through an exhaustive `match`, so adding an attribute forces every lookup to be
//! revisited.

use std::fmt;

use super::codec::Composed;
use super::error::SchemaError;

/// The physical key attributes shared by every item in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyAttr {
    Pk,
    SkGsi,
    Lsi,
    Lsi2,
    GsiSk,
    Gsi2,
    Gsi2Sk,
    Gsi3,
    Gsi3Sk,
}

impl KeyAttr {
    pub const ALL: [KeyAttr; 9] = [
        KeyAttr::Pk,
        KeyAttr::SkGsi,
        KeyAttr::Lsi,
        KeyAttr::Lsi2,
        KeyAttr::GsiSk,
        KeyAttr::Gsi2,
        KeyAttr::Gsi2Sk,
        KeyAttr::Gsi3,
        KeyAttr::Gsi3Sk,
    ];

    /// The table's primary key pair.
    pub const PRIMARY: [KeyAttr; 2] = [KeyAttr::Pk, KeyAttr::SkGsi];

    /// Attribute name as stored in the table.
    pub const fn name(self) -> &'static str {
        match self {
            KeyAttr::Pk => "PK",
            KeyAttr::SkGsi => "SK_GSI",
            KeyAttr::Lsi => "LSI",
            KeyAttr::Lsi2 => "LSI2",
            KeyAttr::GsiSk => "GSI_SK",
            KeyAttr::Gsi2 => "GSI2",
            KeyAttr::Gsi2Sk => "GSI2_SK",
            KeyAttr::Gsi3 => "GSI3",
            KeyAttr::Gsi3Sk => "GSI3_SK",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    /// Returns true if `name` is one of the nine physical key attributes.
    pub fn is_key_attribute(name: &str) -> bool {
        Self::parse(name).is_some()
    }
}

impl fmt::Display for KeyAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composes an attribute value from (possibly partial) key fields.
pub type ComposeFn<K> = fn(&K) -> Option<Composed>;

/// Recovers key fields from a stored attribute value.
///
/// Returns `None` when the value does not carry the slot's discriminator.
pub type DestructFn<K> = fn(&str) -> Option<K>;

/// How one physical attribute is built for an entity.
pub struct KeySlot<K> {
    /// Entity fields consumed, in key order.
    pub fields: &'static [&'static str],
    /// Every discriminator token the slot can emit.
    pub discriminators: &'static [&'static str],
    pub compose: ComposeFn<K>,
    /// Omitted for constant tokens.
    pub destruct: Option<DestructFn<K>>,
}

impl<K> Clone for KeySlot<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for KeySlot<K> {}

impl<K> fmt::Debug for KeySlot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySlot")
            .field("fields", &self.fields)
            .field("discriminators", &self.discriminators)
            .field("destruct", &self.destruct.is_some())
            .finish()
    }
}

/// Per-entity key schema: one optional slot per physical attribute.
pub struct KeySchema<K> {
    pub pk: Option<KeySlot<K>>,
    pub sk_gsi: Option<KeySlot<K>>,
    pub lsi: Option<KeySlot<K>>,
    pub lsi2: Option<KeySlot<K>>,
    pub gsi_sk: Option<KeySlot<K>>,
    pub gsi2: Option<KeySlot<K>>,
    pub gsi2_sk: Option<KeySlot<K>>,
    pub gsi3: Option<KeySlot<K>>,
    pub gsi3_sk: Option<KeySlot<K>>,
}

impl<K> KeySchema<K> {
    /// A schema with no slots, used as the base for struct update syntax.
    pub const EMPTY: Self = Self {
        pk: None,
        sk_gsi: None,
        lsi: None,
        lsi2: None,
        gsi_sk: None,
        gsi2: None,
        gsi2_sk: None,
        gsi3: None,
        gsi3_sk: None,
    };

    pub fn slot(&self, attr: KeyAttr) -> Option<&KeySlot<K>> {
        match attr {
            KeyAttr::Pk => self.pk.as_ref(),
            KeyAttr::SkGsi => self.sk_gsi.as_ref(),
            KeyAttr::Lsi => self.lsi.as_ref(),
            KeyAttr::Lsi2 => self.lsi2.as_ref(),
            KeyAttr::GsiSk => self.gsi_sk.as_ref(),
            KeyAttr::Gsi2 => self.gsi2.as_ref(),
            KeyAttr::Gsi2Sk => self.gsi2_sk.as_ref(),
            KeyAttr::Gsi3 => self.gsi3.as_ref(),
            KeyAttr::Gsi3Sk => self.gsi3_sk.as_ref(),
        }
    }

    /// Attributes this schema writes, in table order.
    pub fn keys_used(&self) -> impl Iterator<Item = KeyAttr> + '_ {
        KeyAttr::ALL
            .into_iter()
            .filter(move |attr| self.slot(*attr).is_some())
    }

    /// Checks the schema is well formed.
    ///
    /// Every `primary` attribute needs a slot, and every slot needs at least one field
    /// or discriminator with no empty tokens.
    pub fn validate(&self, entity: &'static str, primary: &[KeyAttr]) -> Result<(), SchemaError> {
        for attr in primary {
            if self.slot(*attr).is_none() {
                return Err(SchemaError::MissingPrimarySlot {
                    entity,
                    attr: *attr,
                });
            }
        }

        for attr in self.keys_used() {
            let Some(slot) = self.slot(attr) else {
                continue;
            };
            if slot.fields.is_empty() && slot.discriminators.is_empty() {
                return Err(SchemaError::EmptySlot { entity, attr });
            }
            if slot.discriminators.iter().any(|token| token.is_empty()) {
                return Err(SchemaError::EmptyDiscriminator { entity, attr });
            }
        }

        Ok(())
    }
}

impl<K> fmt::Debug for KeySchema<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for attr in self.keys_used() {
            map.entry(&attr.name(), &self.slot(attr));
        }
        map.finish()
    }
}

/// The key-contributing fields of an entity.
///
/// Every field is optional so that a partial set can describe a key prefix.
pub trait KeyFields: Default + Clone + PartialEq + fmt::Debug {
    /// Overlay the fields present in `other` onto `self`.
    fn merge(&mut self, other: Self);

    /// Returns true if every field present in `expected` has the same value in `self`.
    fn matches(&self, expected: &Self) -> bool;

    /// Identifier values that must not contain the key delimiter.
    fn identifiers(&self) -> Vec<(&'static str, &str)>;
}

/// Overlay helper for [`KeyFields::merge`] implementations.
pub fn merge_field<T>(target: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *target = source;
    }
}

/// Comparison helper for [`KeyFields::matches`] implementations.
pub fn field_matches<T: PartialEq>(actual: &Option<T>, expected: &Option<T>) -> bool {
    match expected {
        Some(expected) => actual.as_ref() == Some(expected),
        None => true,
    }
}
