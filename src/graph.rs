//! Resource graph navigation
//!
//! Answers "which resource types live under this instance?" by comparing
//! declared parent chains. Pure and synchronous; the parent relation is
//! acyclic by construction of the declarations, and a cyclic declaration is
//! a configuration error rather than something handled at runtime.

use crate::schema::{Catalogue, Resource};
use std::collections::BTreeSet;

/// Children of `resource` instantiated with `instance_id`.
///
/// A candidate `C` matches iff its declared parent-name set equals, in size
/// and membership, `{resource.singular}` plus `resource`'s own declared
/// parents. Matches are returned as copies whose bindings are seeded with
/// `resource`'s existing bindings plus `{resource.singular: instance_id}`,
/// so they are immediately usable for list/get without re-deriving ancestry.
pub fn children_of(catalogue: &Catalogue, resource: &Resource, instance_id: &str) -> Vec<Resource> {
    let mut expected: BTreeSet<&str> = resource
        .parent_resources()
        .iter()
        .map(String::as_str)
        .collect();
    expected.insert(&resource.singular);

    catalogue
        .resources()
        .iter()
        .filter(|candidate| {
            // A resource is never its own child, even under a self-referential
            // parent declaration.
            if candidate.plural == resource.plural {
                return false;
            }
            let declared: BTreeSet<&str> = candidate
                .parent_resources()
                .iter()
                .map(String::as_str)
                .collect();
            declared == expected
        })
        .map(|candidate| {
            let mut child = candidate.clone();
            child.bindings = resource.bindings.clone();
            child
                .bindings
                .insert(resource.singular.clone(), instance_id.to_string());
            child
        })
        .collect()
}
