//! Classification pass: `ClassShape` → `AnnotationMap`.
//!
//! The algorithm mirrors the member scan of the original engine:
//!
//! 1. Seed the map with declared roles (no validation - a malformed
//!    declaration passes through as-is).
//! 2. Scan own (depth 0) data members: functions are skipped here, handles
//!    and behaviors become `Reference`, everything else becomes `State`.
//! 3. Walk the chain levels upward: unclassified accessors become
//!    `Derived`, unclassified callables (instance functions included)
//!    become `Action`.
//! 4. A name is classified exactly once; later steps never overwrite.
//!
//! With auto-observable off the pass stops after step 1.

use std::fmt;

use super::decl::{ClassShape, MemberKind, RESERVED};
use crate::config;

/// Classification of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Mutations invalidate dependents; wired as an observable container.
    State,
    /// Identity matters, contents untracked (handles, behavior sub-units).
    Reference,
    /// Cached value, recomputed lazily when dependencies change.
    Derived,
    /// Stably-identified callable bound at construction.
    Action,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::State => "state",
            Role::Reference => "reference",
            Role::Derived => "derived",
            Role::Action => "action",
        };
        f.write_str(name)
    }
}

/// Insertion-ordered member-name → [`Role`] map, built once at creation
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationMap {
    entries: Vec<(&'static str, Role)>,
}

impl AnnotationMap {
    /// Role for a member, if classified.
    pub fn role(&self, name: &str) -> Option<Role> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, role)| *role)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.role(name).is_some()
    }

    /// Members in classification order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Role)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert only if the name is not yet classified. Reserved names are
    /// refused outright.
    fn insert_if_absent(&mut self, name: &'static str, role: Role) {
        if RESERVED.contains(&name) || self.contains(name) {
            return;
        }
        self.entries.push((name, role));
    }
}

/// Classify a class shape using the process-wide auto-observable setting.
pub fn infer(shape: &ClassShape) -> AnnotationMap {
    infer_with(shape, config::auto_observable())
}

/// Classify a class shape with an explicit auto-observable mode.
///
/// Pure in its inputs: the same shape and mode always produce the same map.
pub fn infer_with(shape: &ClassShape, auto: bool) -> AnnotationMap {
    let mut map = AnnotationMap::default();

    // Step 1: declared roles, in declaration order.
    for (name, role) in shape.declared() {
        map.insert_if_absent(name, *role);
    }

    if !auto {
        return map;
    }

    // Step 2: own data members. Functions are left for the chain walk.
    for member in shape.members().iter().filter(|m| m.depth == 0) {
        let role = match member.kind {
            MemberKind::Handle | MemberKind::Behavior => Role::Reference,
            MemberKind::Value => Role::State,
            MemberKind::Function => continue,
            // Accessors/methods never sit at depth 0 (ClassShape enforces
            // a minimum chain depth of 1), but match exhaustively.
            MemberKind::Accessor | MemberKind::Method => continue,
        };
        map.insert_if_absent(member.name, role);
    }

    // Step 3: walk the chain upward, one level at a time. The declared
    // levels end where the engine's base marker would sit.
    let max_depth = shape.members().iter().map(|m| m.depth).max().unwrap_or(0);
    for depth in 0..=max_depth {
        for member in shape.members().iter().filter(|m| m.depth == depth) {
            match member.kind {
                MemberKind::Accessor => map.insert_if_absent(member.name, Role::Derived),
                MemberKind::Function | MemberKind::Method => {
                    map.insert_if_absent(member.name, Role::Action)
                }
                _ => {}
            }
        }
    }

    map
}
