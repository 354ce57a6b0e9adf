//! A small typed IR of scalar and vector integer expressions.
//!
//! Expressions are immutable and hash-consed: building the same tree twice yields the same
//! allocation, so structural equality is `==`. Constructors enforce the typing rules.
pub mod constant;
pub mod expr;
pub mod fold;
mod lanes;
mod pretty;
pub mod subst;
pub mod ty;

pub use constant::Constant;
pub use expr::{ArithOp, CmpOp, Expr, ExprKind, LogicOp, TypeError, VAR_COUNT, Var};
pub use subst::Environment;
pub use ty::{ElementType, VectorType, random_element_type, random_type};
