//! Speckle object model and graph traversal

mod base;
pub mod traversal;

pub use base::{Base, DEFAULT_SPECKLE_TYPE, Member};
pub use traversal::{
    FlatObject, Transform, TransformedObject, extract_base_and_transform, flatten_base,
    flatten_base_thorough,
};
