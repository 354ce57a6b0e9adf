//! Random well-typed expressions.

use rand::Rng;
use simpfuzz_ir::{
    ArithOp, CmpOp, Constant, ElementType, Expr, LogicOp, VAR_COUNT, Var, VectorType, random_type,
};

/// The ways an interior node can be built. Each is drawn with the weight given by [`weight`].
///
/// [`weight`]: Constructor::weight
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Constructor {
    Leaf,
    Select,
    Broadcast,
    Ramp,
    Not,
    Condition,
    Cast,
    Binary,
}

impl Constructor {
    const ALL: [Constructor; 8] = [
        Constructor::Leaf,
        Constructor::Select,
        Constructor::Broadcast,
        Constructor::Ramp,
        Constructor::Not,
        Constructor::Condition,
        Constructor::Cast,
        Constructor::Binary,
    ];

    fn weight(self) -> u32 {
        match self {
            // One slot per arithmetic operator.
            Constructor::Binary => ArithOp::ALL.len() as u32,
            _ => 1,
        }
    }

    fn applies_to(self, ty: VectorType) -> bool {
        match self {
            Constructor::Broadcast | Constructor::Ramp => ty.is_vector(),
            Constructor::Not | Constructor::Condition => ty.is_bool(),
            Constructor::Leaf | Constructor::Select | Constructor::Cast | Constructor::Binary => {
                true
            }
        }
    }
}

/// Builds random expressions whose free variables are scalars of a fixed element type, the
/// *pool* type. Variables reach every other type through casts.
pub struct Generator<'a, R> {
    pool: ElementType,
    rng: &'a mut R,
}

impl<'a, R: Rng> Generator<'a, R> {
    pub fn new(pool: ElementType, rng: &'a mut R) -> Self {
        Self { pool, rng }
    }

    /// A random expression of type `ty` at most `depth` interior nodes deep.
    pub fn expr(&mut self, ty: VectorType, depth: u32) -> Expr {
        if depth == 0 {
            return self.leaf(ty, false);
        }
        let depth = depth - 1;
        match self.pick(ty) {
            Constructor::Leaf => self.leaf(ty, false),
            Constructor::Select => {
                let c = self.condition(ty, depth);
                let e1 = self.expr(ty, depth);
                let e2 = self.expr(ty, depth);
                Expr::select(c, e1, e2)
            }
            Constructor::Broadcast => Expr::broadcast(self.expr(ty.element_of(), depth), ty.width()),
            Constructor::Ramp => {
                let base = self.expr(ty.element_of(), depth);
                let stride = self.expr(ty.element_of(), depth);
                Expr::ramp(base, stride, ty.width())
            }
            Constructor::Not => Expr::not(self.expr(ty, depth)),
            Constructor::Condition => {
                // Operands take a fresh random type, not the boolean target type.
                let operand_ty = random_type(ty.width(), &mut *self.rng);
                self.condition(operand_ty, depth)
            }
            Constructor::Cast => {
                let from = random_type(ty.width(), &mut *self.rng);
                Expr::cast(ty, self.expr(from, depth))
            }
            Constructor::Binary if ty.is_bool() => {
                let op = LogicOp::ALL[self.rng.gen_range(0..LogicOp::ALL.len())];
                let e1 = self.expr(ty, depth);
                let e2 = self.expr(ty, depth);
                Expr::logic(op, e1, e2)
            }
            Constructor::Binary => {
                let op = ArithOp::ALL[self.rng.gen_range(0..ArithOp::ALL.len())];
                let e1 = self.expr(ty, depth);
                let e2 = self.expr(ty, depth);
                Expr::arith(op, e1, e2)
            }
        }
    }

    /// A comparison between two random expressions of type `ty`. The result is boolean with the
    /// width of `ty`.
    pub fn condition(&mut self, ty: VectorType, depth: u32) -> Expr {
        let e1 = self.expr(ty, depth);
        let e2 = self.expr(ty, depth);
        let op = CmpOp::ALL[self.rng.gen_range(0..CmpOp::ALL.len())];
        Expr::cmp(op, e1, e2)
    }

    /// A variable cast to `ty` or a literal. Vector leaves are a ramp or a broadcast of scalar
    /// leaves. With `imm_only` scalar leaves are always literals.
    pub fn leaf(&mut self, ty: VectorType, imm_only: bool) -> Expr {
        if ty.is_vector() {
            let elem = ty.element_of();
            return if self.rng.gen_bool(0.5) {
                let base = self.leaf(elem, imm_only);
                let stride = self.leaf(elem, imm_only);
                Expr::ramp(base, stride, ty.width())
            } else {
                Expr::broadcast(self.leaf(elem, imm_only), ty.width())
            };
        }
        if !imm_only && self.rng.gen_ratio(u32::from(VAR_COUNT) - 1, u32::from(VAR_COUNT)) {
            let var = Var::new(self.rng.gen_range(0..VAR_COUNT));
            Expr::cast(ty, Expr::var(var, self.pool))
        } else {
            Expr::constant(random_literal(ty.elem(), &mut *self.rng))
        }
    }

    fn pick(&mut self, ty: VectorType) -> Constructor {
        let candidates = Constructor::ALL.iter().copied().filter(|c| c.applies_to(ty));
        let total: u32 = candidates.clone().map(Constructor::weight).sum();
        let mut n = self.rng.gen_range(0..total);
        for c in candidates {
            if n < c.weight() {
                return c;
            }
            n -= c.weight();
        }
        Constructor::Leaf
    }
}

/// A random expression of type `ty` over variables of its element type.
pub fn generate(ty: VectorType, depth: u32, rng: &mut impl Rng) -> Expr {
    Generator::new(ty.elem(), rng).expr(ty, depth)
}

/// A random literal. `int32` literals are kept small so that arithmetic on them rarely
/// overflows; every other type draws from its whole range.
pub fn random_literal(elem: ElementType, rng: &mut impl Rng) -> Constant {
    let val = match elem {
        ElementType::Int32 => rng.gen_range(-128..128),
        _ => rng.gen_range(elem.min()..=elem.max()),
    };
    Constant::new(elem, val.into())
}
