//! Schema model
//!
//! Turns an AEP-annotated OpenAPI document into a typed resource catalogue.
//!
//! # Architecture
//!
//! - [`document`] - serde model of the OpenAPI subset, JSON or YAML
//! - [`catalogue`] - [`Catalogue`]/[`Resource`] with URL derivation and
//!   custom-method discovery
//! - [`property`] - recursive property trees in declaration order
//! - [`validation`] - property tree -> constraint tree, plus an evaluator
//!
//! The catalogue is read-only after parse and safe to share across tasks.

pub mod catalogue;
pub mod document;
pub mod property;
pub mod validation;

pub use catalogue::{Catalogue, CustomMethod, Resource};
pub use document::Document;
pub use property::{Property, PropertyKind};

use indexmap::IndexMap;

/// Ordered map from `{name}` path-parameter tokens to concrete values,
/// accumulated by the caller while navigating into nested resources.
pub type ParentParameters = IndexMap<String, String>;
