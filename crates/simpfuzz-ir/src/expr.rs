use std::fmt;

use serde::Serialize;
use simpfuzz_arc_interner::{Interned, impl_internable};
use simpfuzz_common::{bug, bug_unless};

use crate::{
    constant::Constant,
    ty::{ElementType, VectorType},
};

/// Size of the pool of free variables.
pub const VAR_COUNT: u8 = 5;

/// One of the free variables `a`, `b`, `c`, `d`, `e`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct Var(u8);

impl Var {
    pub fn new(index: u8) -> Var {
        bug_unless!(index < VAR_COUNT, "variable index `{index}` out of range");
        Var(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The whole pool, in order.
    pub fn all() -> impl Iterator<Item = Var> {
        (0..VAR_COUNT).map(Var)
    }

    pub fn name(self) -> char {
        char::from(b'a' + self.0)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Min,
    Max,
    Div,
    Mod,
}

impl ArithOp {
    pub const ALL: [ArithOp; 7] = [
        ArithOp::Add,
        ArithOp::Sub,
        ArithOp::Mul,
        ArithOp::Min,
        ArithOp::Max,
        ArithOp::Div,
        ArithOp::Mod,
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub const ALL: [LogicOp; 2] = [LogicOp::And, LogicOp::Or];
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub const ALL: [CmpOp; 6] = [CmpOp::Eq, CmpOp::Ne, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge];
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    kind: Interned<ExprKind>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ExprKind {
    /// A free variable. Variables are scalars of the element type of the expression under test
    /// and only ever reach other types through a [`ExprKind::Cast`].
    Var(Var, ElementType),
    Constant(Constant),
    Cast(VectorType, Expr),
    Not(Expr),
    Arith(ArithOp, Expr, Expr),
    Logic(LogicOp, Expr, Expr),
    Cmp(CmpOp, Expr, Expr),
    Select(Expr, Expr, Expr),
    Broadcast(Expr, u32),
    /// `Ramp(base, stride, width)` has value `base + stride * j` in lane `j`.
    Ramp(Expr, Expr, u32),
}

impl_internable!(ExprKind);

impl ExprKind {
    /// Interns the node after checking it against the typing rules. An ill-typed node is a bug in
    /// the caller.
    pub fn intern(self) -> Expr {
        if let Err(err) = self.node_type() {
            bug!("ill-typed expression: {err}");
        }
        Expr { kind: Interned::new(self) }
    }

    /// Type of this node assuming its children are well typed.
    fn node_type(&self) -> Result<VectorType, TypeError> {
        match self {
            ExprKind::Var(_, elem) => Ok(elem.scalar()),
            ExprKind::Constant(c) => Ok(c.ty().scalar()),
            ExprKind::Cast(ty, e) => {
                let found = e.ty();
                if found.width() != ty.width() {
                    return Err(TypeError::WidthMismatch {
                        node: "cast",
                        expected: ty.width(),
                        found: found.width(),
                    });
                }
                Ok(*ty)
            }
            ExprKind::Not(e) => expect_bool("!", e.ty()),
            ExprKind::Arith(op, e1, e2) => same_type(op.symbol(), e1.ty(), e2.ty()),
            ExprKind::Logic(op, e1, e2) => {
                let ty = same_type(op.symbol(), e1.ty(), e2.ty())?;
                expect_bool(op.symbol(), ty)
            }
            ExprKind::Cmp(op, e1, e2) => Ok(same_type(op.symbol(), e1.ty(), e2.ty())?.bool_of()),
            ExprKind::Select(c, e1, e2) => {
                let ty = same_type("select", e1.ty(), e2.ty())?;
                let cond = expect_bool("select", c.ty())?;
                if cond.width() != ty.width() {
                    return Err(TypeError::WidthMismatch {
                        node: "select",
                        expected: ty.width(),
                        found: cond.width(),
                    });
                }
                Ok(ty)
            }
            ExprKind::Broadcast(e, width) => {
                let elem = expect_scalar("broadcast", e.ty())?;
                Ok(elem.with_width(*width))
            }
            ExprKind::Ramp(base, stride, width) => {
                let elem = same_type("ramp", base.ty(), stride.ty())?;
                let elem = expect_scalar("ramp", elem)?;
                Ok(elem.with_width(*width))
            }
        }
    }
}

fn same_type(node: &'static str, lhs: VectorType, rhs: VectorType) -> Result<VectorType, TypeError> {
    if lhs != rhs {
        return Err(TypeError::Mismatch { node, lhs, rhs });
    }
    Ok(lhs)
}

fn expect_bool(node: &'static str, found: VectorType) -> Result<VectorType, TypeError> {
    if !found.is_bool() {
        return Err(TypeError::NotBool { node, found });
    }
    Ok(found)
}

fn expect_scalar(node: &'static str, found: VectorType) -> Result<VectorType, TypeError> {
    if !found.is_scalar() {
        return Err(TypeError::NotScalar { node, found });
    }
    Ok(found)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    Mismatch { node: &'static str, lhs: VectorType, rhs: VectorType },
    NotBool { node: &'static str, found: VectorType },
    NotScalar { node: &'static str, found: VectorType },
    WidthMismatch { node: &'static str, expected: u32, found: u32 },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch { node, lhs, rhs } => {
                write!(f, "operands of `{node}` have different types: `{lhs}` and `{rhs}`")
            }
            TypeError::NotBool { node, found } => {
                write!(f, "`{node}` expects a boolean operand, found `{found}`")
            }
            TypeError::NotScalar { node, found } => {
                write!(f, "`{node}` expects a scalar operand, found `{found}`")
            }
            TypeError::WidthMismatch { node, expected, found } => {
                write!(f, "`{node}` expects width {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for TypeError {}

impl Expr {
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn var(var: Var, elem: ElementType) -> Expr {
        ExprKind::Var(var, elem).intern()
    }

    pub fn constant(c: Constant) -> Expr {
        ExprKind::Constant(c).intern()
    }

    pub fn tt() -> Expr {
        Expr::constant(Constant::bool(true))
    }

    pub fn ff() -> Expr {
        Expr::constant(Constant::bool(false))
    }

    pub fn cast(ty: VectorType, e: impl Into<Expr>) -> Expr {
        ExprKind::Cast(ty, e.into()).intern()
    }

    pub fn not(e: impl Into<Expr>) -> Expr {
        ExprKind::Not(e.into()).intern()
    }

    pub fn arith(op: ArithOp, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        ExprKind::Arith(op, e1.into(), e2.into()).intern()
    }

    pub fn logic(op: LogicOp, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        ExprKind::Logic(op, e1.into(), e2.into()).intern()
    }

    pub fn cmp(op: CmpOp, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        ExprKind::Cmp(op, e1.into(), e2.into()).intern()
    }

    pub fn select(c: impl Into<Expr>, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        ExprKind::Select(c.into(), e1.into(), e2.into()).intern()
    }

    pub fn broadcast(e: impl Into<Expr>, width: u32) -> Expr {
        ExprKind::Broadcast(e.into(), width).intern()
    }

    pub fn ramp(base: impl Into<Expr>, stride: impl Into<Expr>, width: u32) -> Expr {
        ExprKind::Ramp(base.into(), stride.into(), width).intern()
    }

    pub fn add(e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        Expr::arith(ArithOp::Add, e1, e2)
    }

    pub fn mul(e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        Expr::arith(ArithOp::Mul, e1, e2)
    }

    pub fn ty(&self) -> VectorType {
        match self.kind() {
            ExprKind::Var(_, elem) => elem.scalar(),
            ExprKind::Constant(c) => c.ty().scalar(),
            ExprKind::Cast(ty, _) => *ty,
            ExprKind::Not(e) | ExprKind::Arith(_, e, _) | ExprKind::Logic(_, e, _) => e.ty(),
            ExprKind::Cmp(_, e, _) => e.ty().bool_of(),
            ExprKind::Select(_, e, _) => e.ty(),
            ExprKind::Broadcast(e, width) | ExprKind::Ramp(e, _, width) => e.ty().with_width(*width),
        }
    }

    /// Re-validates the whole tree, returning the type of the root.
    pub fn type_check(&self) -> Result<VectorType, TypeError> {
        match self.kind() {
            ExprKind::Var(..) | ExprKind::Constant(_) => {}
            ExprKind::Cast(_, e) | ExprKind::Not(e) | ExprKind::Broadcast(e, _) => {
                e.type_check()?;
            }
            ExprKind::Arith(_, e1, e2)
            | ExprKind::Logic(_, e1, e2)
            | ExprKind::Cmp(_, e1, e2)
            | ExprKind::Ramp(e1, e2, _) => {
                e1.type_check()?;
                e2.type_check()?;
            }
            ExprKind::Select(c, e1, e2) => {
                c.type_check()?;
                e1.type_check()?;
                e2.type_check()?;
            }
        }
        self.kind().node_type()
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind(), ExprKind::Constant(_))
    }

    pub fn as_constant(&self) -> Option<Constant> {
        if let ExprKind::Constant(c) = self.kind() { Some(*c) } else { None }
    }

    /// Whether this is a literal, possibly broadcast to a vector.
    pub fn as_broadcast_constant(&self) -> Option<Constant> {
        match self.kind() {
            ExprKind::Constant(c) => Some(*c),
            ExprKind::Broadcast(e, _) => e.as_constant(),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.as_constant().and_then(Constant::to_bool) == Some(true)
    }

    pub fn is_false(&self) -> bool {
        self.as_constant().and_then(Constant::to_bool) == Some(false)
    }
}

impl From<Constant> for Expr {
    fn from(c: Constant) -> Self {
        Expr::constant(c)
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const I32: ElementType = ElementType::Int32;

    fn a() -> Expr {
        Expr::var(Var::new(0), I32)
    }

    fn b() -> Expr {
        Expr::var(Var::new(1), I32)
    }

    #[test]
    fn structural_equality_is_sharing() {
        let e1 = Expr::add(a(), b());
        let e2 = Expr::add(a(), b());
        assert_eq!(e1, e2);
        assert_ne!(e1, Expr::add(b(), a()));
    }

    #[test]
    fn node_types() {
        let cmp = Expr::cmp(CmpOp::Lt, a(), b());
        assert_eq!(cmp.ty(), ElementType::Bool.scalar());

        let ramp = Expr::ramp(a(), b(), 4);
        assert_eq!(ramp.ty(), I32.vector_of(4));

        let cast = Expr::cast(ElementType::UInt8.vector_of(4), &ramp);
        assert_eq!(cast.ty(), ElementType::UInt8.vector_of(4));

        let sel = Expr::select(Expr::cmp(CmpOp::Eq, &ramp, &ramp), &ramp, Expr::broadcast(a(), 4));
        assert_eq!(sel.type_check(), Ok(I32.vector_of(4)));
    }

    #[test]
    fn ill_typed_nodes_are_rejected() {
        let kind = ExprKind::Arith(ArithOp::Add, a(), Expr::cast(ElementType::UInt8.scalar(), b()));
        assert!(matches!(kind.node_type(), Err(TypeError::Mismatch { .. })));

        let kind = ExprKind::Not(a());
        assert!(matches!(kind.node_type(), Err(TypeError::NotBool { .. })));

        let kind = ExprKind::Broadcast(Expr::broadcast(a(), 2), 4);
        assert!(matches!(kind.node_type(), Err(TypeError::NotScalar { .. })));

        let cond = Expr::cmp(CmpOp::Lt, a(), b());
        let kind = ExprKind::Select(cond, Expr::broadcast(a(), 2), Expr::broadcast(b(), 2));
        assert!(matches!(kind.node_type(), Err(TypeError::WidthMismatch { .. })));
    }

    #[test]
    #[should_panic(expected = "ill-typed expression")]
    fn constructors_panic_on_ill_typed_input() {
        Expr::logic(LogicOp::And, a(), b());
    }

    #[test]
    fn constant_queries() {
        assert!(Expr::tt().is_true());
        assert!(Expr::ff().is_false());
        assert!(!a().is_const());
        let c = Constant::new(I32, 7);
        assert_eq!(Expr::broadcast(c, 4).as_broadcast_constant(), Some(c));
    }
}
