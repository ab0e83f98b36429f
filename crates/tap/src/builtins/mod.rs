//! The primitive catalogue.
//!
//! The dispatcher only fixes the *contract* a primitive must satisfy —
//! argument-by-index access, no mutation of its inputs, a single return
//! value, and the scope it's allowed to populate. This module populates
//! a representative catalogue built on that contract, covering
//! arithmetic, comparison, logic, strings, arrays, objects, dates, and
//! control flow.

mod arithmetic;
mod arrays;
mod compare;
mod control;
mod dates;
mod logic;
mod objects;
mod strings;

use crate::dispatch::{PrimitiveFn, PrimitiveTable};
use crate::env::EnvStack;
use crate::expr::{Expr, ExprKind, FunctionBody, Param, TapFunction};
use crate::symtab::{Entry, EntryKind};

/// Registers a single primitive overload under `name`: allocates a
/// `PrimitiveId` in `table`, builds the `TapFunction` signature metadata
/// from `params`/`variadic`, and binds it into the root scope so the
/// dispatcher finds it via the ordinary name-lookup path, exactly like
/// any user binding.
fn register(
    table: &mut PrimitiveTable,
    envs: &mut EnvStack,
    name: &str,
    params: Vec<Param>,
    variadic: bool,
    func: PrimitiveFn,
) {
    let id = table.register(func);
    let function = TapFunction {
        name: Some(name.to_string()),
        params,
        variadic,
        body: FunctionBody::Primitive(id),
    };
    let value = Expr::new(ExprKind::Function(function), 0, 0);
    envs.get_mut(0).table.insert(Entry::new(name, EntryKind::Primitive, value));
}

/// Populates `table` with every built-in primitive and binds each under
/// its name in the root scope of `envs`.
pub fn register_all(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    control::register(table, envs);
    arithmetic::register(table, envs);
    compare::register(table, envs);
    logic::register(table, envs);
    strings::register(table, envs);
    arrays::register(table, envs);
    dates::register(table, envs);
    objects::register(table, envs);
}
