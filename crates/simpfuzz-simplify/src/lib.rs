//! Expression simplification.
//!
//! [`Simplify`] rewrites bottom-up: literal operands are folded, a handful of algebraic identities
//! are applied, and element-wise operations on broadcasts and ramps are pushed into their scalar
//! parts. A fully bound expression simplifies to a literal unless it is undefined, i.e. it divides
//! by zero or overflows `int32`, in which case the offending node is left in place.

use simpfuzz_ir::{
    ArithOp, CmpOp, Constant, Expr, ExprKind, LogicOp, VectorType,
    fold::{TypeFoldable, TypeFolder},
};

/// A rewriter producing an equivalent, presumably simpler, expression of the same type.
pub trait Simplifier {
    fn simplify(&self, expr: &Expr) -> Expr;
}

impl<S: Simplifier + ?Sized> Simplifier for &S {
    fn simplify(&self, expr: &Expr) -> Expr {
        (**self).simplify(expr)
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct Simplify;

impl Simplifier for Simplify {
    fn simplify(&self, expr: &Expr) -> Expr {
        expr.fold_with(&mut Folder)
    }
}

struct Folder;

impl TypeFolder for Folder {
    fn fold_expr(&mut self, expr: &Expr) -> Expr {
        match expr.kind() {
            ExprKind::Var(..) | ExprKind::Constant(_) => expr.clone(),
            ExprKind::Cast(ty, e) => cast(*ty, e.fold_with(self)),
            ExprKind::Not(e) => not(e.fold_with(self)),
            ExprKind::Arith(op, e1, e2) => arith(*op, e1.fold_with(self), e2.fold_with(self)),
            ExprKind::Logic(op, e1, e2) => logic(*op, e1.fold_with(self), e2.fold_with(self)),
            ExprKind::Cmp(op, e1, e2) => cmp(*op, e1.fold_with(self), e2.fold_with(self)),
            ExprKind::Select(c, e1, e2) => {
                select(c.fold_with(self), e1.fold_with(self), e2.fold_with(self))
            }
            ExprKind::Broadcast(e, width) => Expr::broadcast(e.fold_with(self), *width),
            ExprKind::Ramp(base, stride, width) => {
                ramp(base.fold_with(self), stride.fold_with(self), *width)
            }
        }
    }
}

/// A literal of type `ty`, broadcast if `ty` is a vector.
fn splat(c: Constant, ty: VectorType) -> Expr {
    if ty.is_scalar() { Expr::constant(c) } else { Expr::broadcast(c, ty.width()) }
}

/// The scalar operands of two broadcasts.
fn broadcasts(e1: &Expr, e2: &Expr) -> Option<(Expr, Expr, u32)> {
    match (e1.kind(), e2.kind()) {
        (ExprKind::Broadcast(x1, width), ExprKind::Broadcast(x2, _)) => {
            Some((x1.clone(), x2.clone(), *width))
        }
        _ => None,
    }
}

fn bool_value(e: &Expr) -> Option<bool> {
    e.as_broadcast_constant().and_then(Constant::to_bool)
}

fn cast(ty: VectorType, e: Expr) -> Expr {
    if e.ty() == ty {
        return e;
    }
    match e.kind() {
        ExprKind::Constant(c) => Expr::constant(c.cast(ty.elem())),
        ExprKind::Broadcast(x, width) => Expr::broadcast(cast(ty.element_of(), x.clone()), *width),
        _ => Expr::cast(ty, e),
    }
}

fn not(e: Expr) -> Expr {
    match e.kind() {
        ExprKind::Constant(c) => Expr::constant(c.not()),
        ExprKind::Not(x) => x.clone(),
        ExprKind::Broadcast(x, width) => Expr::broadcast(not(x.clone()), *width),
        _ => Expr::not(e),
    }
}

fn arith(op: ArithOp, e1: Expr, e2: Expr) -> Expr {
    if let Some((x1, x2, width)) = broadcasts(&e1, &e2) {
        return Expr::broadcast(arith(op, x1, x2), width);
    }
    if let (Some(c1), Some(c2)) = (e1.as_constant(), e2.as_constant()) {
        return match Constant::arith(op, c1, c2) {
            Some(c) => Expr::constant(c),
            None => Expr::arith(op, e1, e2),
        };
    }

    let ty = e1.ty();
    let zero = || splat(Constant::zero(ty.elem()), ty);
    let (k1, k2) = (e1.as_broadcast_constant(), e2.as_broadcast_constant());
    let is_zero = |k: Option<Constant>| k.is_some_and(|c| c.is_zero());
    let is_one = |k: Option<Constant>| k.is_some_and(|c| c.is_one());

    match op {
        ArithOp::Add if is_zero(k2) => e1,
        ArithOp::Add if is_zero(k1) => e2,
        ArithOp::Sub if is_zero(k2) => e1,
        ArithOp::Sub if e1 == e2 => zero(),
        ArithOp::Mul if is_one(k2) => e1,
        ArithOp::Mul if is_one(k1) => e2,
        ArithOp::Mul if is_zero(k1) || is_zero(k2) => zero(),
        ArithOp::Div if is_one(k2) => e1,
        ArithOp::Mod if is_one(k2) => zero(),
        ArithOp::Min | ArithOp::Max if e1 == e2 => e1,
        _ => ramp_arith(op, e1, e2),
    }
}

/// Pushes additions, subtractions and multiplications into ramps.
fn ramp_arith(op: ArithOp, e1: Expr, e2: Expr) -> Expr {
    use ArithOp::{Add, Mul, Sub};
    use ExprKind::{Broadcast, Ramp};

    match (op, e1.kind(), e2.kind()) {
        (Add | Sub, Ramp(base, stride, width), Broadcast(x, _)) => {
            ramp(arith(op, base.clone(), x.clone()), stride.clone(), *width)
        }
        (Add, Broadcast(x, _), Ramp(base, stride, width)) => {
            ramp(arith(Add, x.clone(), base.clone()), stride.clone(), *width)
        }
        (Add | Sub, Ramp(b1, s1, width), Ramp(b2, s2, _)) => {
            ramp(arith(op, b1.clone(), b2.clone()), arith(op, s1.clone(), s2.clone()), *width)
        }
        (Mul, Ramp(base, stride, width), Broadcast(x, _)) => {
            ramp(arith(Mul, base.clone(), x.clone()), arith(Mul, stride.clone(), x.clone()), *width)
        }
        (Mul, Broadcast(x, _), Ramp(base, stride, width)) => {
            ramp(arith(Mul, x.clone(), base.clone()), arith(Mul, x.clone(), stride.clone()), *width)
        }
        _ => Expr::arith(op, &e1, &e2),
    }
}

fn logic(op: LogicOp, e1: Expr, e2: Expr) -> Expr {
    if let Some((x1, x2, width)) = broadcasts(&e1, &e2) {
        return Expr::broadcast(logic(op, x1, x2), width);
    }
    if let (Some(c1), Some(c2)) = (e1.as_constant(), e2.as_constant()) {
        return Expr::constant(Constant::logic(op, c1, c2));
    }

    let ty = e1.ty();
    let (k1, k2) = (bool_value(&e1), bool_value(&e2));
    match op {
        LogicOp::And if k1 == Some(false) || k2 == Some(false) => splat(Constant::bool(false), ty),
        LogicOp::And if k1 == Some(true) => e2,
        LogicOp::And if k2 == Some(true) => e1,
        LogicOp::Or if k1 == Some(true) || k2 == Some(true) => splat(Constant::bool(true), ty),
        LogicOp::Or if k1 == Some(false) => e2,
        LogicOp::Or if k2 == Some(false) => e1,
        _ if e1 == e2 => e1,
        _ => Expr::logic(op, e1, e2),
    }
}

fn cmp(op: CmpOp, e1: Expr, e2: Expr) -> Expr {
    if let Some((x1, x2, width)) = broadcasts(&e1, &e2) {
        return Expr::broadcast(cmp(op, x1, x2), width);
    }
    if let (Some(c1), Some(c2)) = (e1.as_constant(), e2.as_constant()) {
        return Expr::constant(Constant::cmp(op, c1, c2));
    }
    if e1 == e2 {
        let reflexive = matches!(op, CmpOp::Eq | CmpOp::Le | CmpOp::Ge);
        return splat(Constant::bool(reflexive), e1.ty().bool_of());
    }
    Expr::cmp(op, e1, e2)
}

fn select(c: Expr, e1: Expr, e2: Expr) -> Expr {
    match bool_value(&c) {
        Some(true) => return e1,
        Some(false) => return e2,
        None => {}
    }
    if e1 == e2 {
        return e1;
    }
    if let (ExprKind::Broadcast(x, width), Some((y1, y2, _))) = (c.kind(), broadcasts(&e1, &e2)) {
        return Expr::broadcast(select(x.clone(), y1, y2), *width);
    }
    Expr::select(c, e1, e2)
}

fn ramp(base: Expr, stride: Expr, width: u32) -> Expr {
    if stride.as_constant().is_some_and(|c| c.is_zero()) {
        return Expr::broadcast(base, width);
    }
    Expr::ramp(base, stride, width)
}

#[cfg(test)]
mod tests {
    use simpfuzz_ir::{ElementType, Environment, Var};

    use super::*;

    const I32: ElementType = ElementType::Int32;
    const U8: ElementType = ElementType::UInt8;

    fn var(i: u8, elem: ElementType) -> Expr {
        Expr::var(Var::new(i), elem)
    }

    fn int(v: i128) -> Expr {
        Expr::constant(Constant::new(I32, v))
    }

    fn simplify(e: &Expr) -> Expr {
        Simplify.simplify(e)
    }

    #[test]
    fn folds_literals() {
        let e = Expr::add(int(2), Expr::mul(int(3), int(4)));
        assert_eq!(simplify(&e), int(14));

        let e = Expr::cmp(CmpOp::Ge, int(-1), int(5));
        assert_eq!(simplify(&e), Expr::ff());
    }

    #[test]
    fn undefined_operations_stay_residual() {
        let div = Expr::arith(ArithOp::Div, int(1), int(0));
        assert_eq!(simplify(&div), div);

        let overflow = Expr::add(int(i32::MAX.into()), int(1));
        assert!(!simplify(&overflow).is_const());

        let c = Constant::new(U8, 255);
        let wraps = Expr::add(c, c);
        assert_eq!(simplify(&wraps), Expr::constant(Constant::new(U8, 254)));
    }

    #[test]
    fn algebraic_identities() {
        let a = var(0, I32);
        assert_eq!(simplify(&Expr::add(&a, int(0))), a);
        assert_eq!(simplify(&Expr::mul(int(1), &a)), a);
        assert_eq!(simplify(&Expr::mul(&a, int(0))), int(0));
        assert_eq!(simplify(&Expr::arith(ArithOp::Sub, &a, &a)), int(0));
        assert_eq!(simplify(&Expr::arith(ArithOp::Max, &a, &a)), a);
        assert_eq!(simplify(&Expr::cmp(CmpOp::Lt, &a, &a)), Expr::ff());
        assert_eq!(simplify(&Expr::not(Expr::not(Expr::cmp(CmpOp::Eq, &a, int(1))))), {
            Expr::cmp(CmpOp::Eq, &a, int(1))
        });
    }

    #[test]
    fn boolean_short_circuits() {
        let a = var(0, I32);
        let p = Expr::cmp(CmpOp::Lt, &a, int(3));
        assert_eq!(simplify(&Expr::logic(LogicOp::And, &p, Expr::ff())), Expr::ff());
        assert_eq!(simplify(&Expr::logic(LogicOp::Or, Expr::ff(), &p)), p);
        assert_eq!(simplify(&Expr::select(Expr::tt(), &a, int(0))), a);
        assert_eq!(simplify(&Expr::select(&p, &a, &a)), a);
    }

    #[test]
    fn casts() {
        let a = var(0, U8);
        assert_eq!(simplify(&Expr::cast(U8.scalar(), &a)), a);
        let e = Expr::cast(U8.scalar(), int(300));
        assert_eq!(simplify(&e), Expr::constant(Constant::new(U8, 44)));
        let e = Expr::cast(ElementType::Bool.vector_of(4), Expr::broadcast(int(2), 4));
        assert_eq!(simplify(&e), Expr::broadcast(Expr::tt(), 4));
    }

    #[test]
    fn vector_rewrites() {
        let a = var(0, I32);
        let b = var(1, I32);

        let e = Expr::add(Expr::broadcast(int(1), 4), Expr::broadcast(int(2), 4));
        assert_eq!(simplify(&e), Expr::broadcast(int(3), 4));

        let e = Expr::ramp(&a, int(0), 4);
        assert_eq!(simplify(&e), Expr::broadcast(&a, 4));

        let e = Expr::add(Expr::ramp(&a, &b, 4), Expr::broadcast(int(5), 4));
        assert_eq!(simplify(&e), Expr::ramp(Expr::add(&a, int(5)), &b, 4));

        let e = Expr::mul(Expr::ramp(int(1), int(2), 2), Expr::broadcast(int(3), 2));
        assert_eq!(simplify(&e), Expr::ramp(int(3), int(6), 2));

        let e = Expr::arith(ArithOp::Sub, Expr::ramp(&a, &b, 2), Expr::ramp(&a, &b, 2));
        assert_eq!(simplify(&e), Expr::broadcast(int(0), 2));
    }

    #[test]
    fn agrees_with_lanes_after_substitution() {
        let a = var(0, ElementType::Int8);
        let b = var(1, ElementType::Int8);
        let e = Expr::mul(Expr::ramp(&a, &b, 4), Expr::broadcast(&b, 4));
        let simplified = simplify(&e);
        let env: Environment = [
            (Var::new(0), Constant::new(ElementType::Int8, 100)),
            (Var::new(1), Constant::new(ElementType::Int8, -77)),
        ]
        .into_iter()
        .collect();
        for lane in 0..4 {
            let lhs = simplify(&e.extract_lane(lane).substitute(&env));
            let rhs = simplify(&simplified.extract_lane(lane).substitute(&env));
            assert!(lhs.is_const());
            assert_eq!(lhs, rhs, "lane {lane}");
        }
    }
}
