use std::{collections::BTreeMap, fmt};

use simpfuzz_common::bug;

use crate::{
    constant::Constant,
    expr::{Expr, ExprKind, Var},
    fold::{TypeFoldable, TypeFolder, TypeSuperFoldable},
};

/// A binding of free variables to scalar literals, ordered by variable name.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Environment {
    bindings: BTreeMap<Var, Constant>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: Var, value: Constant) {
        self.bindings.insert(var, value);
    }

    pub fn get(&self, var: Var) -> Option<Constant> {
        self.bindings.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, Constant)> + '_ {
        self.bindings.iter().map(|(var, c)| (*var, *c))
    }
}

impl FromIterator<(Var, Constant)> for Environment {
    fn from_iter<I: IntoIterator<Item = (Var, Constant)>>(iter: I) -> Self {
        Environment { bindings: iter.into_iter().collect() }
    }
}

/// One `name = value` line per binding.
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (var, value) in self.iter() {
            writeln!(f, "{var} = {value}")?;
        }
        Ok(())
    }
}

impl Expr {
    /// Replaces every bound variable by its literal. Unbound variables are left in place.
    pub fn substitute(&self, env: &Environment) -> Expr {
        struct Subst<'a> {
            env: &'a Environment,
        }

        impl TypeFolder for Subst<'_> {
            fn fold_expr(&mut self, expr: &Expr) -> Expr {
                match expr.kind() {
                    ExprKind::Var(var, elem) => {
                        match self.env.get(*var) {
                            Some(c) if c.ty() == *elem => Expr::constant(c),
                            Some(c) => {
                                bug!("variable `{var}: {elem}` bound to a `{}` literal", c.ty())
                            }
                            None => expr.clone(),
                        }
                    }
                    _ => expr.super_fold_with(self),
                }
            }
        }

        self.fold_with(&mut Subst { env })
    }
}
