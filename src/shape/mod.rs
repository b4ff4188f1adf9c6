//! Shape Inference
//!
//! Classifies a view-model's members into State / Reference / Derived /
//! Action from a registration-time description of the class layout.
//!
//! # Data Flow
//!
//! ```text
//! ClassShape (declarative layout) → infer() → AnnotationMap (name → Role)
//! ```
//!
//! The layout is declared once per class with [`ClassShape`] (usually by
//! `ObservableBuilder` as members are wired); [`infer`] is a pure function
//! of that layout, so every instance of the same class classifies
//! identically. Declared roles always win over inferred ones, and a name is
//! classified exactly once - later inference steps never overwrite.

mod decl;
mod infer;

pub use decl::{ClassShape, MemberDecl, MemberKind};
pub use infer::{AnnotationMap, Role, infer, infer_with};
