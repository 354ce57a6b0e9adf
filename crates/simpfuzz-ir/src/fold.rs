//! Generic traversals over expression trees.
//!
//! A [`TypeFolder`] rebuilds a tree bottom-up and a [`TypeVisitor`] walks it, possibly stopping
//! early. Implementors override `fold_expr`/`visit_expr` and call back into `super_fold_with` or
//! `super_visit_with` for the nodes they don't handle.

use std::ops::ControlFlow;

use crate::{
    expr::{Expr, ExprKind, Var},
    ty::ElementType,
};

pub trait TypeFolder: Sized {
    fn fold_expr(&mut self, expr: &Expr) -> Expr {
        expr.super_fold_with(self)
    }
}

pub trait TypeVisitor: Sized {
    type BreakTy;

    fn visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::BreakTy> {
        expr.super_visit_with(self)
    }
}

pub trait TypeFoldable: Sized {
    fn fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self;
}

pub trait TypeSuperFoldable: TypeFoldable {
    fn super_fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self;
}

pub trait TypeVisitable {
    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy>;

    /// Free variables occurring in `self` with their types, in order of first occurrence.
    fn free_vars(&self) -> Vec<(Var, ElementType)> {
        struct CollectVars(Vec<(Var, ElementType)>);

        impl TypeVisitor for CollectVars {
            type BreakTy = ();

            fn visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
                match expr.kind() {
                    ExprKind::Var(var, elem) if !self.0.iter().any(|(v, _)| v == var) => {
                        self.0.push((*var, *elem));
                    }
                    _ => {}
                }
                expr.super_visit_with(self)
            }
        }

        let mut collector = CollectVars(vec![]);
        let _ = self.visit_with(&mut collector);
        collector.0
    }

    /// Number of nodes in the tree, counting shared subtrees once per occurrence.
    fn node_count(&self) -> usize {
        struct Count(usize);

        impl TypeVisitor for Count {
            type BreakTy = ();

            fn visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
                self.0 += 1;
                expr.super_visit_with(self)
            }
        }

        let mut count = Count(0);
        let _ = self.visit_with(&mut count);
        count.0
    }
}

pub trait TypeSuperVisitable: TypeVisitable {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy>;
}

impl TypeFoldable for Expr {
    fn fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self {
        folder.fold_expr(self)
    }
}

impl TypeSuperFoldable for Expr {
    fn super_fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self {
        match self.kind() {
            ExprKind::Var(..) | ExprKind::Constant(_) => self.clone(),
            ExprKind::Cast(ty, e) => Expr::cast(*ty, e.fold_with(folder)),
            ExprKind::Not(e) => Expr::not(e.fold_with(folder)),
            ExprKind::Arith(op, e1, e2) => {
                Expr::arith(*op, e1.fold_with(folder), e2.fold_with(folder))
            }
            ExprKind::Logic(op, e1, e2) => {
                Expr::logic(*op, e1.fold_with(folder), e2.fold_with(folder))
            }
            ExprKind::Cmp(op, e1, e2) => Expr::cmp(*op, e1.fold_with(folder), e2.fold_with(folder)),
            ExprKind::Select(c, e1, e2) => {
                Expr::select(c.fold_with(folder), e1.fold_with(folder), e2.fold_with(folder))
            }
            ExprKind::Broadcast(e, width) => Expr::broadcast(e.fold_with(folder), *width),
            ExprKind::Ramp(base, stride, width) => {
                Expr::ramp(base.fold_with(folder), stride.fold_with(folder), *width)
            }
        }
    }
}

impl TypeVisitable for Expr {
    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        visitor.visit_expr(self)
    }
}

impl TypeSuperVisitable for Expr {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        match self.kind() {
            ExprKind::Var(..) | ExprKind::Constant(_) => ControlFlow::Continue(()),
            ExprKind::Cast(_, e) | ExprKind::Not(e) | ExprKind::Broadcast(e, _) => {
                e.visit_with(visitor)
            }
            ExprKind::Arith(_, e1, e2)
            | ExprKind::Logic(_, e1, e2)
            | ExprKind::Cmp(_, e1, e2)
            | ExprKind::Ramp(e1, e2, _) => {
                e1.visit_with(visitor)?;
                e2.visit_with(visitor)
            }
            ExprKind::Select(c, e1, e2) => {
                c.visit_with(visitor)?;
                e1.visit_with(visitor)?;
                e2.visit_with(visitor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constant::Constant, expr::CmpOp};

    #[test]
    fn free_vars_in_first_occurrence_order() {
        let (a, c) = (Var::new(0), Var::new(2));
        let ea = Expr::var(a, ElementType::UInt8);
        let ec = Expr::var(c, ElementType::UInt8);
        let e = Expr::select(Expr::cmp(CmpOp::Lt, &ec, &ea), Expr::add(&ea, &ea), &ec);
        assert_eq!(e.free_vars(), vec![(c, ElementType::UInt8), (a, ElementType::UInt8)]);
        assert_eq!(e.node_count(), 8);
    }

    #[test]
    fn identity_fold_preserves_sharing() {
        struct Identity;
        impl TypeFolder for Identity {}

        let x = Expr::var(Var::new(1), ElementType::Int16);
        let e = Expr::ramp(&x, Expr::constant(Constant::one(ElementType::Int16)), 4);
        assert_eq!(e.fold_with(&mut Identity), e);
    }
}
