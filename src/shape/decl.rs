//! Declarative class layout.
//!
//! A [`ClassShape`] is the static description of a view-model class: an
//! ordered list of members, each with a structural [`MemberKind`] and a
//! chain depth, plus any explicitly declared roles. Depth 0 is the
//! instance's own layout; [`ClassShape::base`] opens the next inheritance
//! level upward. The engine's own reserved names (lifecycle hooks, `props`,
//! `view`) are never part of a shape's classifiable surface.

use super::infer::Role;

/// Member names owned by the engine itself; never classified.
pub(crate) const RESERVED: &[&str] = &[
    "props",
    "view",
    "on_create",
    "on_layout_mount",
    "on_mount",
    "on_unmount",
];

/// Structural kind of a member as it appears in the class layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Plain data field initialized on the instance.
    Value,
    /// Single-slot opaque handle (one `current` field, host element refs).
    Handle,
    /// Embedded behavior sub-unit; already independently reactive.
    Behavior,
    /// Callable stored directly on the instance.
    Function,
    /// Get-only accessor declared on a chain level.
    Accessor,
    /// Callable declared on a chain level.
    Method,
}

/// One member of the class layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: &'static str,
    pub kind: MemberKind,
    /// 0 = own instance layout; 1.. = inheritance levels upward.
    pub depth: u8,
}

/// Static layout of a view-model class.
///
/// Built once per class, in declaration order. The builder methods are
/// chainable so a shape reads like the class it describes:
///
/// ```
/// use viewbind::shape::ClassShape;
///
/// let shape = ClassShape::new("Counter")
///     .value("count")
///     .accessor("doubled")
///     .method("increment");
/// ```
#[derive(Debug, Clone)]
pub struct ClassShape {
    name: &'static str,
    members: Vec<MemberDecl>,
    declared: Vec<(&'static str, Role)>,
    current_depth: u8,
}

impl ClassShape {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            members: Vec::new(),
            declared: Vec::new(),
            current_depth: 0,
        }
    }

    /// Class name (used for diagnostics).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Explicitly declare a member's role. Declared entries take precedence
    /// over every inferred classification and are never overwritten. The
    /// first declaration for a name wins; the role itself is not validated
    /// against the member's structural kind.
    pub fn declare(mut self, name: &'static str, role: Role) -> Self {
        if !self.declared.iter().any(|(n, _)| *n == name) {
            self.declared.push((name, role));
        }
        self
    }

    /// Plain data field on the instance.
    pub fn value(self, name: &'static str) -> Self {
        self.push(name, MemberKind::Value, 0)
    }

    /// Single-slot opaque handle on the instance.
    pub fn handle(self, name: &'static str) -> Self {
        self.push(name, MemberKind::Handle, 0)
    }

    /// Embedded behavior sub-unit on the instance.
    pub fn behavior(self, name: &'static str) -> Self {
        self.push(name, MemberKind::Behavior, 0)
    }

    /// Callable stored directly on the instance.
    pub fn function(self, name: &'static str) -> Self {
        self.push(name, MemberKind::Function, 0)
    }

    /// Get-only accessor on the current chain level (level 1 unless
    /// [`base`](Self::base) has been called).
    pub fn accessor(mut self, name: &'static str) -> Self {
        let depth = self.chain_depth();
        self.members.push(MemberDecl { name, kind: MemberKind::Accessor, depth });
        self
    }

    /// Callable on the current chain level.
    pub fn method(mut self, name: &'static str) -> Self {
        let depth = self.chain_depth();
        self.members.push(MemberDecl { name, kind: MemberKind::Method, depth });
        self
    }

    /// Open the next inheritance level: subsequent `accessor`/`method`
    /// declarations belong to the superclass. The walk in `infer` stops at
    /// the end of the declared levels, which stands in for the engine's
    /// base marker.
    pub fn base(mut self) -> Self {
        self.current_depth = self.chain_depth() + 1;
        self
    }

    fn chain_depth(&self) -> u8 {
        // Accessors and methods live on the chain, never on the instance
        // itself, so the minimum depth for them is 1.
        self.current_depth.max(1)
    }

    fn push(mut self, name: &'static str, kind: MemberKind, depth: u8) -> Self {
        self.members.push(MemberDecl { name, kind, depth });
        self
    }

    pub(crate) fn members(&self) -> &[MemberDecl] {
        &self.members
    }

    pub(crate) fn declared(&self) -> &[(&'static str, Role)] {
        &self.declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_preserved() {
        let shape = ClassShape::new("T")
            .value("a")
            .handle("b")
            .accessor("c")
            .value("d");

        let names: Vec<_> = shape.members().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_accessors_default_to_level_one() {
        let shape = ClassShape::new("T").accessor("doubled").method("increment");
        assert!(shape.members().iter().all(|m| m.depth == 1));
    }

    #[test]
    fn test_base_opens_next_level() {
        let shape = ClassShape::new("T")
            .accessor("own")
            .base()
            .accessor("inherited")
            .base()
            .method("deep");

        let depths: Vec<_> = shape.members().iter().map(|m| m.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn test_first_declaration_wins() {
        let shape = ClassShape::new("T")
            .declare("x", Role::Reference)
            .declare("x", Role::State);
        assert_eq!(shape.declared(), &[("x", Role::Reference)]);
    }
}
