pub use builtin::Builtin;

use std::collections::HashMap;
use std::rc::Rc;

use crate::parse::{Block, Stmt};
use crate::value::Func;
use crate::{Error, Expr, LogicOp, Result, Value};

mod builtin;
mod ops;
#[cfg(test)]
mod test;

// Low enough that hitting the limit never exhausts the native stack, even
// under the smaller stacks test threads run on.
const MAX_CALL_DEPTH: usize = 64;

#[derive(Debug)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// A tree walking interpreter over one working namespace.
///
/// Document level bindings go straight into the working namespace; function
/// calls push a fresh local scope that shadows it.
pub struct Evaluator<'a> {
    globals: &'a mut HashMap<String, Value>,
    locals: Vec<HashMap<String, Value>>,
    assigned: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(globals: &'a mut HashMap<String, Value>) -> Self {
        Self {
            globals,
            locals: Vec::new(),
            assigned: Vec::new(),
        }
    }

    /// Names bound at document scope during evaluation, in binding order.
    pub fn into_assigned(self) -> Vec<String> {
        self.assigned
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        if let Some(scope) = self.locals.last() {
            if let Some(value) = scope.get(name) {
                return Some(value);
            }
        }
        self.globals.get(name)
    }

    fn assign(&mut self, name: &str, value: Value) {
        match self.locals.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => {
                self.globals.insert(name.to_string(), value);
                self.assigned.push(name.to_string());
            }
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Val(value) => Ok(value.clone()),
            Expr::Ident(name) => self
                .lookup(name)
                .cloned()
                .ok_or_else(|| Error::UndefinedName(name.clone())),
            Expr::Attr(base, attr) => match self.eval_expr(base)? {
                Value::Module(module) => {
                    let key = format!("{}.{attr}", module.name());
                    self.globals
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| Error::NoModuleAttr(module.name(), attr.clone()))
                }
                value => Err(Error::NoAttr(value.type_name(), attr.clone())),
            },
            Expr::Call(callee, args) => {
                let callee = self.eval_expr(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.call(callee, values)
            }
            Expr::Index(base, index) => {
                let base = self.eval_expr(base)?;
                let index = self.eval_expr(index)?;
                ops::index(base, index)
            }
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Unary(op, operand) => {
                let operand = self.eval_expr(operand)?;
                ops::un_op(*op, operand)
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                ops::bin_op(*op, lhs, rhs)
            }
            // logic operators short-circuit and yield the deciding operand
            Expr::Logic(LogicOp::And, lhs, rhs) => {
                let lhs = self.eval_expr(lhs)?;
                if lhs.truthy() {
                    self.eval_expr(rhs)
                } else {
                    Ok(lhs)
                }
            }
            Expr::Logic(LogicOp::Or, lhs, rhs) => {
                let lhs = self.eval_expr(lhs)?;
                if lhs.truthy() {
                    Ok(lhs)
                } else {
                    self.eval_expr(rhs)
                }
            }
        }
    }

    pub fn exec_block(&mut self, block: &Block) -> Result<()> {
        match self.exec_stmts(block)? {
            Flow::Normal => Ok(()),
            Flow::Break => Err(Error::BreakOutsideLoop),
            Flow::Continue => Err(Error::ContinueOutsideLoop),
            Flow::Return(_) => Err(Error::ReturnOutsideFunction),
        }
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => (),
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.assign(name, value);
                Ok(Flow::Normal)
            }
            Stmt::FuncDef { name, params, body } => {
                let func = Func {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                };
                self.assign(name, Value::Func(Rc::new(func)));
                Ok(Flow::Normal)
            }
            Stmt::If {
                branches,
                else_body,
            } => {
                for (cond, body) in branches {
                    if self.eval_expr(cond)?.truthy() {
                        return self.exec_stmts(body);
                    }
                }
                match else_body {
                    Some(body) => self.exec_stmts(body),
                    None => Ok(Flow::Normal),
                }
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.truthy() {
                    match self.exec_stmts(body)? {
                        Flow::Normal | Flow::Continue => (),
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For { name, iter, body } => {
                let items = iterate(self.eval_expr(iter)?)?;
                for item in items {
                    self.assign(name, item);
                    match self.exec_stmts(body)? {
                        Flow::Normal | Flow::Continue => (),
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(expr) => {
                if self.locals.is_empty() {
                    return Err(Error::ReturnOutsideFunction);
                }
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Builtin(builtin) => builtin::call(builtin, args),
            Value::Func(func) => self.call_func(&func, args),
            value => Err(Error::NotCallable(value.type_name())),
        }
    }

    fn call_func(&mut self, func: &Func, args: Vec<Value>) -> Result<Value> {
        if args.len() != func.params.len() {
            return Err(Error::ArgCount {
                name: func.name.clone(),
                expected: func.params.len(),
                found: args.len(),
            });
        }
        if self.locals.len() >= MAX_CALL_DEPTH {
            return Err(Error::RecursionLimit);
        }

        let mut scope = HashMap::new();
        for (param, arg) in func.params.iter().zip(args) {
            scope.insert(param.clone(), arg);
        }
        self.locals.push(scope);
        let flow = self.exec_stmts(&func.body);
        self.locals.pop();

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::None),
            Flow::Break => Err(Error::BreakOutsideLoop),
            Flow::Continue => Err(Error::ContinueOutsideLoop),
        }
    }
}

fn iterate(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        value => Err(Error::NotIterable(value.type_name())),
    }
}
