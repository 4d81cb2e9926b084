//! Virtual Machine Core
//!
//! Defines the SVM structure and its execution loop. All mutable runtime
//! state (operand stack, return addresses, scope chain, heap handles) is
//! owned by one `VirtualMachine`; nothing is shared between instances.

use std::io::Write;

use log::{debug, trace};

use crate::bytecode::Instruction;
use crate::config::SvmConfig;
use crate::error::{SvmError, SvmResult};

use super::memory::ScopeChain;
use super::stack::Stack;
use super::value::Value;

/// Stack Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine {
    config: SvmConfig,
    stack: Stack,
    scopes: ScopeChain,

    instructions: Vec<u8>,
    ip: usize,

    call_stack: Vec<usize>,
    halted: bool,
}

impl VirtualMachine {
    /// Create a new VM instance over a raw bytecode blob
    pub fn new(config: SvmConfig, instructions: Vec<u8>) -> Self {
        VirtualMachine {
            stack: Stack::new(config.max_stack_size),
            scopes: ScopeChain::new(config.max_bindings),
            instructions,
            ip: 0,
            call_stack: Vec::with_capacity(config.max_call_depth),
            halted: false,
            config,
        }
    }

    /// Execute bytecode until EXIT, end of bytecode, or error.
    ///
    /// PRINT output goes to `out`, one line per value. After an error the
    /// VM stays halted and executes nothing further.
    pub fn execute<W: Write>(&mut self, out: &mut W) -> SvmResult<()> {
        while !self.halted && self.ip < self.instructions.len() {
            if let Err(err) = self.step(out) {
                self.halted = true;
                debug!("halted on error at offset {}: {}", self.ip, err);
                return Err(err);
            }
        }
        self.halted = true;
        out.flush()?;
        Ok(())
    }

    /// Decode and execute a single instruction
    fn step<W: Write>(&mut self, out: &mut W) -> SvmResult<()> {
        let offset = self.ip;
        let (instruction, next) = Instruction::decode(&self.instructions, offset)?;
        self.ip = next;
        trace!("{:04} {}", offset, instruction);

        match instruction {
            Instruction::PushNum(n) => self.stack.push(Value::Number(n)),
            Instruction::PushStr(bytes) => self.stack.push(Value::string(&bytes)),
            Instruction::PushBool(b) => self.stack.push(Value::Boolean(b)),
            Instruction::PushUndefined => self.stack.push(Value::Undefined),
            Instruction::PushNull => self.stack.push(Value::Null),

            Instruction::PushVar(name) => {
                let value = self.scopes.lookup(&name).ok_or_else(|| {
                    SvmError::UndefinedVariable(String::from_utf8_lossy(&name).into_owned())
                })?;
                self.stack.push(value)
            }
            Instruction::StoreVar(name) => {
                let value = self.stack.pop()?;
                self.scopes.bind(&name, value)
            }

            Instruction::Add => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                let sum = add(&a, &b)?;
                self.stack.push(sum)
            }

            Instruction::NewObject => self
                .stack
                .push(Value::object(self.config.max_properties)),
            Instruction::SetProp(name) => {
                let value = self.stack.pop()?;
                let target = self.stack.pop()?;
                match &target {
                    Value::Object(obj) => {
                        let displaced = obj.borrow_mut().set(&name, value)?;
                        drop(displaced);
                    }
                    other => {
                        return Err(SvmError::NotAnObject {
                            op: "SET_PROP",
                            found: other.type_name(),
                        })
                    }
                }
                self.stack.push(target)
            }
            Instruction::GetProp(name) => {
                let target = self.stack.pop()?;
                let value = match &target {
                    Value::Object(obj) => obj.borrow().get(&name).unwrap_or(Value::Undefined),
                    other => {
                        return Err(SvmError::NotAnObject {
                            op: "GET_PROP",
                            found: other.type_name(),
                        })
                    }
                };
                self.stack.push(value)
            }

            Instruction::PushEnv => {
                self.scopes.push_scope();
                debug!("entered scope (depth {})", self.scopes.depth());
                Ok(())
            }
            Instruction::PopEnv => {
                self.scopes.pop_scope()?;
                debug!("left scope (depth {})", self.scopes.depth());
                Ok(())
            }

            Instruction::Call(target) => {
                let dest = usize::try_from(target)
                    .ok()
                    .filter(|&t| t <= self.instructions.len())
                    .ok_or(SvmError::InvalidCallTarget(target))?;
                if self.call_stack.len() >= self.config.max_call_depth {
                    return Err(SvmError::CallStackOverflow);
                }
                self.call_stack.push(self.ip);
                self.ip = dest;
                Ok(())
            }
            Instruction::Ret => {
                self.ip = self.call_stack.pop().ok_or(SvmError::CallStackUnderflow)?;
                Ok(())
            }

            Instruction::Print => {
                let value = self.stack.pop()?;
                let mut line = value.display_text();
                line.push(b'\n');
                out.write_all(&line)?;
                Ok(())
            }
            Instruction::Exit => {
                debug!("exit at offset {}", offset);
                self.halted = true;
                Ok(())
            }
        }
    }

    /// Clone of the value on top of the operand stack
    pub fn peek_top(&self) -> SvmResult<Value> {
        self.stack.peek().cloned()
    }

    /// Resolve a variable from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes.lookup(name.as_bytes())
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.size()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

/// Number + Number sums; any pairing with a string concatenates the
/// coerced text of both sides; everything else is a type error.
fn add(a: &Value, b: &Value) -> SvmResult<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x + y)),
        (Value::String(_), _) | (_, Value::String(_)) => {
            let mut buf = Vec::new();
            a.append_text(&mut buf);
            b.append_text(&mut buf);
            Ok(Value::string(&buf))
        }
        _ => Err(SvmError::UnsupportedAdd {
            left: a.type_name(),
            right: b.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{BytecodeWriter, OpCode};

    fn run(code: Vec<u8>) -> (VirtualMachine, SvmResult<()>, String) {
        let mut vm = VirtualMachine::new(SvmConfig::new(), code);
        let mut out: Vec<u8> = Vec::new();
        let res = vm.execute(&mut out);
        (vm, res, String::from_utf8(out).unwrap())
    }

    fn writer() -> BytecodeWriter {
        BytecodeWriter::new(1024)
    }

    #[test]
    fn boolean_plus_number_is_a_type_error() {
        let mut w = writer();
        w.emit_op(OpCode::PushBool).unwrap();
        w.emit_u8(1).unwrap();
        w.emit_op(OpCode::PushNum).unwrap();
        w.emit_f64(1.0).unwrap();
        w.emit_op(OpCode::Add).unwrap();
        w.emit_op(OpCode::PushStr).unwrap();
        w.emit_name(b"unreached").unwrap();
        w.emit_op(OpCode::Print).unwrap();

        let (vm, res, out) = run(w.finish());
        assert!(matches!(
            res,
            Err(SvmError::UnsupportedAdd { left: "boolean", right: "number" })
        ));
        assert!(out.is_empty());
        assert!(vm.is_halted());
    }

    #[test]
    fn call_and_ret_resume_after_call() {
        // 0: CALL 7 | 5: PRINT | 6: EXIT | 7: PUSH_STR "hi" | 11: RET
        let mut w = writer();
        w.emit_op(OpCode::Call).unwrap();
        w.emit_i32(7).unwrap();
        w.emit_op(OpCode::Print).unwrap();
        w.emit_op(OpCode::Exit).unwrap();
        w.emit_op(OpCode::PushStr).unwrap();
        w.emit_name(b"hi").unwrap();
        w.emit_op(OpCode::Ret).unwrap();

        let (vm, res, out) = run(w.finish());
        res.unwrap();
        assert_eq!(out, "hi\n");
        assert_eq!(vm.call_depth(), 0);
    }

    #[test]
    fn runaway_recursion_hits_call_stack_limit() {
        let mut w = writer();
        w.emit_op(OpCode::Call).unwrap();
        w.emit_i32(0).unwrap();

        let (vm, res, _) = run(w.finish());
        assert!(matches!(res, Err(SvmError::CallStackOverflow)));
        assert_eq!(vm.call_depth(), 16);
    }

    #[test]
    fn ret_without_call_fails() {
        let (_, res, _) = run(vec![OpCode::Ret as u8]);
        assert!(matches!(res, Err(SvmError::CallStackUnderflow)));
    }

    #[test]
    fn call_outside_bytecode_fails() {
        let mut w = writer();
        w.emit_op(OpCode::Call).unwrap();
        w.emit_i32(-3).unwrap();
        let (_, res, _) = run(w.finish());
        assert!(matches!(res, Err(SvmError::InvalidCallTarget(-3))));
    }

    #[test]
    fn get_prop_on_number_is_a_type_error() {
        let mut w = writer();
        w.emit_op(OpCode::PushNum).unwrap();
        w.emit_f64(4.0).unwrap();
        w.emit_op(OpCode::GetProp).unwrap();
        w.emit_name(b"p").unwrap();
        let (_, res, _) = run(w.finish());
        assert!(matches!(
            res,
            Err(SvmError::NotAnObject { op: "GET_PROP", found: "number" })
        ));
    }

    #[test]
    fn set_prop_pushes_the_object_back() {
        let mut w = writer();
        w.emit_op(OpCode::NewObject).unwrap();
        w.emit_op(OpCode::PushNum).unwrap();
        w.emit_f64(5.0).unwrap();
        w.emit_op(OpCode::SetProp).unwrap();
        w.emit_name(b"p").unwrap();
        w.emit_op(OpCode::Exit).unwrap();

        let (vm, res, _) = run(w.finish());
        res.unwrap();
        assert_eq!(vm.stack_depth(), 1);
        match vm.peek_top().unwrap() {
            Value::Object(obj) => assert_eq!(obj.borrow().get(b"p"), Some(Value::Number(5.0))),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn unresolved_variable_is_a_name_error() {
        let mut w = writer();
        w.emit_op(OpCode::PushVar).unwrap();
        w.emit_name(b"ghost").unwrap();
        let (_, res, _) = run(w.finish());
        match res {
            Err(SvmError::UndefinedVariable(name)) => assert_eq!(name, "ghost"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn stack_overflow_trapped() {
        let mut cfg = SvmConfig::new();
        cfg.max_stack_size = 1;
        let code = vec![OpCode::PushNull as u8, OpCode::PushNull as u8];
        let mut vm = VirtualMachine::new(cfg, code);
        let res = vm.execute(&mut Vec::<u8>::new());
        assert!(matches!(res, Err(SvmError::StackOverflow)));
    }

    #[test]
    fn exit_stops_before_remaining_instructions() {
        let code = vec![OpCode::Exit as u8, 0xEE];
        let (vm, res, _) = run(code);
        res.unwrap();
        assert!(vm.is_halted());
    }

    #[test]
    fn pop_env_on_global_scope_fails() {
        let (_, res, _) = run(vec![OpCode::PopEnv as u8]);
        assert!(matches!(res, Err(SvmError::ScopeUnderflow)));
    }

    #[test]
    fn running_off_the_end_halts_cleanly() {
        let (vm, res, _) = run(vec![OpCode::PushEnv as u8, OpCode::PushNull as u8]);
        res.unwrap();
        assert_eq!(vm.scope_depth(), 2);
        assert_eq!(vm.stack_depth(), 1);
    }
}
