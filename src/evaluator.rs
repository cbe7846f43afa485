use crate::ast::{Condition, Stmt, TypedValue};
use crate::error::RuntimeCondition;
use crate::lexer::Token;
use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::io::{self, Write};

/// Variables of one program run. A value's variant is its type tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn type_of(&self, name: &str) -> Option<ValueType> {
        self.values.get(name).map(Value::value_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Adds a new variable; the name must not exist yet.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeCondition> {
        if self.values.contains_key(name) {
            return Err(RuntimeCondition::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Overwrites an existing variable, type included.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeCondition> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeCondition::UndeclaredVariable {
                name: name.to_string(),
            }),
        }
    }

    fn resolve(&self, value: &TypedValue) -> Value {
        value.resolve(|word| self.get(word).cloned())
    }
}

/// Why a statement sequence stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Abort {
    Return(Token),
    Condition(RuntimeCondition),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Abort(Abort),
}

/// Executes statements, writing program output to `out`.
pub struct Evaluator<'out, W: Write> {
    out: &'out mut W,
    verbose: bool,
}

impl<'out, W: Write> Evaluator<'out, W> {
    pub fn new(out: &'out mut W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    /// Runs `statements` in order, stopping at the first abort.
    pub fn run(&mut self, statements: &[Stmt], env: &mut Environment) -> io::Result<Flow> {
        for statement in statements {
            if let Flow::Abort(reason) = self.execute(statement, env)? {
                self.trace("-- error / return --")?;
                return Ok(Flow::Abort(reason));
            }
        }
        Ok(Flow::Continue)
    }

    fn execute(&mut self, stmt: &Stmt, env: &mut Environment) -> io::Result<Flow> {
        match stmt {
            Stmt::Print { operand, .. } => {
                self.trace("-- print statement --")?;
                match env.get(&operand.lexeme) {
                    Some(value) => write!(self.out, "{}", value)?,
                    None => write!(self.out, "{}", operand.lexeme)?,
                }
                if self.verbose {
                    writeln!(self.out)?;
                }
                Ok(Flow::Continue)
            }
            Stmt::Return { operand, .. } => {
                self.trace("-- return statement --")?;
                Ok(Flow::Abort(Abort::Return(operand.clone())))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = match condition {
                    Condition::Literal(b) => *b,
                    Condition::Variable(name) => match env.get(name).and_then(Value::as_bool) {
                        Some(b) => b,
                        None => {
                            let found = env.type_of(name);
                            return self.fail(RuntimeCondition::TypeMismatch {
                                name: name.clone(),
                                found,
                            });
                        }
                    },
                };

                self.trace("-- if statement --")?;
                if condition {
                    self.trace("-- main branch --")?;
                    self.run(then_branch, env)
                } else {
                    self.trace("-- alternative branch --")?;
                    self.run(else_branch, env)
                }
            }
            Stmt::Var { name, value, .. } => {
                self.trace("-- var statement --")?;
                let value = env.resolve(value);
                match env.declare(name, value) {
                    Ok(()) => Ok(Flow::Continue),
                    Err(condition) => self.fail(condition),
                }
            }
            Stmt::Set { name, value, .. } => {
                self.trace("-- set statement --")?;
                let value = env.resolve(value);
                match env.assign(name, value) {
                    Ok(()) => Ok(Flow::Continue),
                    Err(condition) => self.fail(condition),
                }
            }
        }
    }

    /// Reports `condition` to the output and aborts.
    fn fail(&mut self, condition: RuntimeCondition) -> io::Result<Flow> {
        tracing::debug!(%condition, "runtime condition");
        if self.verbose {
            writeln!(self.out, "ERROR, {}", condition)?;
        } else {
            write!(self.out, "ERROR")?;
        }
        Ok(Flow::Abort(Abort::Condition(condition)))
    }

    fn trace(&mut self, line: &str) -> io::Result<()> {
        if self.verbose {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Cursor;
    use crate::parser::parse_program;
    use pretty_assertions::assert_eq;

    fn execute(source: &str, verbose: bool) -> (String, Flow, Environment) {
        let program = parse_program(&mut Cursor::new(source)).unwrap();
        let mut out = Vec::new();
        let mut env = Environment::new();
        let flow = Evaluator::new(&mut out, verbose)
            .run(&program.statements, &mut env)
            .unwrap();
        (String::from_utf8(out).unwrap(), flow, env)
    }

    #[test]
    fn environment_declare_and_assign() {
        let mut env = Environment::new();
        env.declare("a", Value::Integer("1".to_string())).unwrap();
        assert_eq!(
            env.declare("a", Value::Boolean(true)),
            Err(RuntimeCondition::DuplicateDeclaration {
                name: "a".to_string()
            })
        );
        env.assign("a", Value::String("x".to_string())).unwrap();
        assert_eq!(env.type_of("a"), Some(ValueType::String));
        assert_eq!(
            env.assign("b", Value::Integer("2".to_string())),
            Err(RuntimeCondition::UndeclaredVariable {
                name: "b".to_string()
            })
        );
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn print_prefers_variables_over_literal_text() {
        let (out, flow, _) = execute("start print a var a 3 print a end", false);
        assert_eq!(out, "a3");
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn anything_value_copies_variable_when_declared() {
        let (_, _, env) = execute("start var a true var b a var c word end", false);
        assert_eq!(env.get("b"), Some(&Value::Boolean(true)));
        assert_eq!(env.get("c"), Some(&Value::String("word".to_string())));
    }

    #[test]
    fn anything_value_is_resolved_at_execution_time() {
        // `a` is declared after `b := a` was parsed but before it runs
        let (_, _, env) = execute("start var b a var a 1 set b a end", false);
        assert_eq!(env.get("b"), Some(&Value::Integer("1".to_string())));
    }

    #[test]
    fn set_changes_the_stored_type() {
        let (out, _, env) = execute("start var a 5 set a true print a end", false);
        assert_eq!(out, "true");
        assert_eq!(env.type_of("a"), Some(ValueType::Boolean));
    }

    #[test]
    fn return_inside_if_aborts_the_program() {
        let (out, flow, _) = execute(
            "start print 1 if true print 2 return 0 print 3 end else end print 4 end",
            false,
        );
        assert_eq!(out, "12");
        match flow {
            Flow::Abort(Abort::Return(token)) => assert_eq!(token.lexeme, "0"),
            other => panic!("unexpected flow {:?}", other),
        }
    }

    #[test]
    fn non_boolean_condition_is_a_type_mismatch() {
        let (out, flow, _) = execute("start var n 4 if n print a end else print b end print c end", false);
        assert_eq!(out, "ERROR");
        assert_eq!(
            flow,
            Flow::Abort(Abort::Condition(RuntimeCondition::TypeMismatch {
                name: "n".to_string(),
                found: Some(ValueType::Integer),
            }))
        );
    }

    #[test]
    fn undeclared_condition_is_a_type_mismatch() {
        let (_, flow, _) = execute("start if ghost end else end end", false);
        assert_eq!(
            flow,
            Flow::Abort(Abort::Condition(RuntimeCondition::TypeMismatch {
                name: "ghost".to_string(),
                found: None,
            }))
        );
    }

    #[test]
    fn untaken_branch_has_no_side_effects() {
        let (out, _, env) = execute(
            "start if true print yes end else var hidden 1 print no end end",
            false,
        );
        assert_eq!(out, "yes");
        assert!(!env.contains("hidden"));
    }

    #[test]
    fn variable_condition_selects_branch() {
        let (out, _, _) = execute(
            "start var f false if f print yes end else print no end end",
            false,
        );
        assert_eq!(out, "no");
    }

    #[test]
    fn verbose_mode_traces_each_statement() {
        let (out, _, _) = execute("start var a 1 var a 2 end", true);
        assert_eq!(
            out,
            "-- var statement --\n\
             -- var statement --\n\
             ERROR, duplicate var declaration 'a'\n\
             -- error / return --\n"
        );
    }

    #[test]
    fn verbose_print_ends_lines() {
        let (out, _, _) = execute("start if true print x end else end end", true);
        assert_eq!(
            out,
            "-- if statement --\n\
             -- main branch --\n\
             -- print statement --\n\
             x\n"
        );
    }
}
