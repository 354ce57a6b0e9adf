use std::fmt;

use serde::Serialize;

use crate::{
    expr::{ArithOp, CmpOp, LogicOp},
    ty::ElementType,
};

/// A scalar literal. The value is always kept inside the representable range of `ty`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct Constant {
    ty: ElementType,
    val: i64,
}

impl Constant {
    /// Makes a literal of type `ty`, reducing `val` modulo 2^bits.
    pub fn new(ty: ElementType, val: i128) -> Constant {
        Constant { ty, val: ty.wrap(val) }
    }

    pub fn bool(b: bool) -> Constant {
        Constant { ty: ElementType::Bool, val: i64::from(b) }
    }

    pub fn zero(ty: ElementType) -> Constant {
        Constant { ty, val: 0 }
    }

    pub fn one(ty: ElementType) -> Constant {
        Constant { ty, val: 1 }
    }

    pub fn ty(&self) -> ElementType {
        self.ty
    }

    pub fn val(&self) -> i64 {
        self.val
    }

    pub fn is_zero(&self) -> bool {
        self.val == 0
    }

    pub fn is_one(&self) -> bool {
        self.val == 1
    }

    pub fn to_bool(self) -> Option<bool> {
        if self.ty.is_bool() { Some(self.val != 0) } else { None }
    }

    /// Folds an arithmetic operation. Returns `None` when the result is undefined: division or
    /// modulo by zero, and signed 32-bit overflow. Every other type wraps.
    pub fn arith(op: ArithOp, c1: Constant, c2: Constant) -> Option<Constant> {
        let ty = c1.ty;
        let (a, b) = (i128::from(c1.val), i128::from(c2.val));
        let val = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Min => a.min(b),
            ArithOp::Max => a.max(b),
            ArithOp::Div if b == 0 => return None,
            ArithOp::Div => a.div_euclid(b),
            ArithOp::Mod if b == 0 => return None,
            ArithOp::Mod => a.rem_euclid(b),
        };
        if ty == ElementType::Int32 && !ty.contains(val) {
            return None;
        }
        Some(Constant::new(ty, val))
    }

    pub fn cmp(op: CmpOp, c1: Constant, c2: Constant) -> Constant {
        let (a, b) = (c1.val, c2.val);
        Constant::bool(match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        })
    }

    pub fn logic(op: LogicOp, c1: Constant, c2: Constant) -> Constant {
        let (a, b) = (c1.val != 0, c2.val != 0);
        Constant::bool(match op {
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
        })
    }

    pub fn not(self) -> Constant {
        Constant::bool(self.val == 0)
    }

    /// Casting to `bool` tests for non-zero; every other cast truncates or extends.
    pub fn cast(self, ty: ElementType) -> Constant {
        if ty.is_bool() { Constant::bool(self.val != 0) } else { Constant::new(ty, self.val.into()) }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ElementType::Int32 => write!(f, "{}", self.val),
            ElementType::Bool => write!(f, "{}", self.val != 0),
            ty => write!(f, "({ty}){}", self.val),
        }
    }
}
