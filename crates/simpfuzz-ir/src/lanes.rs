use simpfuzz_common::bug_unless;

use crate::{
    constant::Constant,
    expr::{Expr, ExprKind},
};

impl Expr {
    /// The scalar expression computing lane `lane` of `self`. A scalar is its own lane 0.
    pub fn extract_lane(&self, lane: u32) -> Expr {
        let width = self.ty().width();
        bug_unless!(lane < width, "lane {lane} out of range for width {width}");
        if width == 1 {
            return self.clone();
        }
        match self.kind() {
            ExprKind::Var(..) | ExprKind::Constant(_) => self.clone(),
            ExprKind::Cast(ty, e) => Expr::cast(ty.element_of(), e.extract_lane(lane)),
            ExprKind::Not(e) => Expr::not(e.extract_lane(lane)),
            ExprKind::Arith(op, e1, e2) => {
                Expr::arith(*op, e1.extract_lane(lane), e2.extract_lane(lane))
            }
            ExprKind::Logic(op, e1, e2) => {
                Expr::logic(*op, e1.extract_lane(lane), e2.extract_lane(lane))
            }
            ExprKind::Cmp(op, e1, e2) => Expr::cmp(*op, e1.extract_lane(lane), e2.extract_lane(lane)),
            ExprKind::Select(c, e1, e2) => {
                Expr::select(c.extract_lane(lane), e1.extract_lane(lane), e2.extract_lane(lane))
            }
            ExprKind::Broadcast(e, _) => e.clone(),
            ExprKind::Ramp(base, stride, _) => {
                let j = Constant::new(base.ty().elem(), lane.into());
                Expr::add(base, Expr::mul(stride, j))
            }
        }
    }
}
