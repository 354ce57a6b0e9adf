use std::fmt;

use crate::expr::{ArithOp, CmpOp, Expr, ExprKind, LogicOp};

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
            ArithOp::Min => "min",
            ArithOp::Max => "max",
        }
    }
}

impl LogicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Var(var, _) => write!(f, "{var}"),
            ExprKind::Constant(c) => write!(f, "{c}"),
            ExprKind::Cast(ty, e) => write!(f, "({ty}){e}"),
            ExprKind::Not(e) => write!(f, "!{e}"),
            ExprKind::Arith(op @ (ArithOp::Min | ArithOp::Max), e1, e2) => {
                write!(f, "{}({e1}, {e2})", op.symbol())
            }
            ExprKind::Arith(op, e1, e2) => write!(f, "({e1} {} {e2})", op.symbol()),
            ExprKind::Logic(op, e1, e2) => write!(f, "({e1} {} {e2})", op.symbol()),
            ExprKind::Cmp(op, e1, e2) => write!(f, "({e1} {} {e2})", op.symbol()),
            ExprKind::Select(c, e1, e2) => write!(f, "select({c}, {e1}, {e2})"),
            ExprKind::Broadcast(e, width) => write!(f, "x{width}({e})"),
            ExprKind::Ramp(base, stride, width) => write!(f, "ramp({base}, {stride}, {width})"),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}: {}", self.ty())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        constant::Constant,
        expr::{ArithOp, CmpOp, Expr, LogicOp, Var},
        ty::ElementType,
    };

    #[test]
    fn infix_and_call_syntax() {
        let a = Expr::var(Var::new(0), ElementType::Int32);
        let b = Expr::var(Var::new(1), ElementType::Int32);
        let u8x4 = ElementType::UInt8.vector_of(4);

        let e = Expr::cast(u8x4, Expr::ramp(&a, Expr::arith(ArithOp::Min, &a, &b), 4));
        assert_eq!(e.to_string(), "(uint8x4)ramp(a, min(a, b), 4)");

        let lt = Expr::cmp(CmpOp::Lt, &a, &b);
        let gt = Expr::cmp(CmpOp::Gt, &a, Constant::new(ElementType::Int32, -1));
        let e = Expr::select(Expr::logic(LogicOp::And, &lt, Expr::not(&gt)), &a, &b);
        assert_eq!(e.to_string(), "select(((a < b) && !(a > -1)), a, b)");

        let e = Expr::broadcast(Expr::arith(ArithOp::Mod, &a, &b), 2);
        assert_eq!(e.to_string(), "x2((a % b))");
        assert_eq!(format!("{e:?}"), "x2((a % b)): int32x2");
    }
}
