//! Key composition and decomposition for the slackmap table.
//!
//! Every entity shares one DynamoDB table. This crate holds the pure parts: the key
//! codec, per-entity key schemas, the transform engine that converts entities to
//! stored records and back, storage and cache contracts, and change-stream decoding.
//! I/O lives in the `slackmap` crate.

pub mod cache;
pub mod entities;
pub mod keys;
pub mod storage;
pub mod stream;
pub mod transform;
