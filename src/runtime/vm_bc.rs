use crate::bytecode::{Bytecode, OpCode};
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;
use std::collections::HashMap;
use std::io::{self, Stdout, Write};

#[derive(Debug, Clone)]
pub struct VmBcConfig {
    pub max_stack_size: usize,
    pub max_variables: usize,
    pub max_steps: Option<usize>,
}

impl Default for VmBcConfig {
    fn default() -> Self {
        VmBcConfig {
            max_stack_size: 256,
            max_variables: 256,
            max_steps: None,
        }
    }
}

/// Stack machine executing `Bytecode`, writing `print` output to `W`.
pub struct VmBc<W: Write = Stdout> {
    stack: Vec<Value>,
    /// Keyed by symbol index; created on first `Load` or `Store`.
    variables: HashMap<u8, Value>,
    // Safety limits
    config: VmBcConfig,
    steps: usize,
    out: W,
}

impl VmBc<Stdout> {
    pub fn new() -> Self {
        Self::with_config(VmBcConfig::default())
    }

    pub fn with_config(config: VmBcConfig) -> Self {
        Self::with_output(config, io::stdout())
    }
}

impl Default for VmBc<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> VmBc<W> {
    pub fn with_output(config: VmBcConfig, out: W) -> Self {
        Self {
            stack: Vec::new(),
            variables: HashMap::new(),
            config,
            steps: 0,
            out,
        }
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Current value of the variable with the given symbol index, if it has
    /// been touched.
    pub fn variable(&self, symbol: u8) -> Option<Value> {
        self.variables.get(&symbol).copied()
    }

    /// Number of instructions executed by the last `run`.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn reset_execution_state(&mut self) {
        self.stack.clear();
        self.variables.clear();
        self.steps = 0;
    }

    /// Runs `bc` from offset 0 until `Halt`, `Return` or the end of the
    /// stream. Output is flushed whether or not execution succeeds.
    pub fn run(&mut self, bc: &Bytecode) -> Result<(), RuntimeError> {
        self.reset_execution_state();
        log::debug!(
            "running {} bytes ({} constants, {} symbols)",
            bc.len(),
            bc.constants.len(),
            bc.symbols.len()
        );

        let result = self.exec(bc);
        let flushed = self.out.flush();

        match &result {
            Ok(()) => log::debug!("halted after {} steps", self.steps),
            Err(e) => log::debug!("stopped after {} steps: {}", self.steps, e),
        }

        result?;
        flushed?;
        Ok(())
    }

    // Execution

    fn check_limits(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;

        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        Ok(())
    }

    fn exec(&mut self, bc: &Bytecode) -> Result<(), RuntimeError> {
        let code = &bc.code;
        let mut ip: usize = 0;

        while ip < code.len() {
            self.check_limits()?;

            let offset = ip;
            let op = OpCode::try_from(code[ip])
                .map_err(|opcode| RuntimeError::UnknownOpcode { opcode, offset })?;

            let operand = if op.has_operand() {
                *code.get(ip + 1).ok_or(RuntimeError::TruncatedInstruction {
                    offset,
                    op: op.mnemonic(),
                })?
            } else {
                0
            };
            ip += op.width();

            log::trace!("{:04} {:<10} {:>3} stack={:?}", offset, op, operand, self.stack);

            match op {
                OpCode::Constant => {
                    let value = *bc.constants.get(operand as usize).ok_or(
                        RuntimeError::InvalidConstant {
                            offset,
                            index: operand,
                        },
                    )?;
                    self.push(value, offset)?;
                }

                OpCode::Load => {
                    check_symbol(bc, operand, offset)?;
                    let value = *self.slot(operand)?;
                    self.push(value, offset)?;
                }
                OpCode::Store => {
                    check_symbol(bc, operand, offset)?;
                    let value = self.pop(offset, op, 1)?;
                    *self.slot(operand)? = value;
                }

                // Arithmetic
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Mod => {
                    let (left, right) = self.pop_two(offset, op)?;
                    let result = arithmetic(op, left, right, offset)?;
                    self.push(result, offset)?;
                }

                // Comparison
                OpCode::Gt
                | OpCode::Lt
                | OpCode::GtEq
                | OpCode::LtEq
                | OpCode::Eq
                | OpCode::NotEq => {
                    let (left, right) = self.pop_two(offset, op)?;
                    let holds = match op {
                        OpCode::Gt => left > right,
                        OpCode::Lt => left < right,
                        OpCode::GtEq => left >= right,
                        OpCode::LtEq => left <= right,
                        OpCode::Eq => left == right,
                        _ => left != right,
                    };
                    self.push(Value::from(holds), offset)?;
                }

                // Control flow
                OpCode::Jump => {
                    ip = jump(ip, operand, offset, code.len())?;
                }
                OpCode::JumpIfFalse => {
                    let cond = self.pop(offset, op, 1)?;
                    if cond == 0 {
                        ip = jump(ip, operand, offset, code.len())?;
                    }
                }

                OpCode::Print => {
                    let value = self.pop(offset, op, 1)?;
                    write!(self.out, "{}", value)?;
                }

                OpCode::Return | OpCode::Halt => return Ok(()),

                // Reserved, never emitted by the compiler.
                OpCode::Call => {
                    return Err(RuntimeError::UnknownOpcode {
                        opcode: op.into(),
                        offset,
                    });
                }
            }
        }

        Ok(())
    }

    // Stack operations

    fn push(&mut self, value: Value, offset: usize) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.max_stack_size {
            return Err(RuntimeError::StackOverflow {
                offset,
                limit: self.config.max_stack_size,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, offset: usize, op: OpCode, needed: usize) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            offset,
            op: op.mnemonic(),
            needed,
        })
    }

    /// Pops the right operand, then the left.
    fn pop_two(&mut self, offset: usize, op: OpCode) -> Result<(Value, Value), RuntimeError> {
        if self.stack.len() < 2 {
            return Err(RuntimeError::StackUnderflow {
                offset,
                op: op.mnemonic(),
                needed: 2,
            });
        }
        let right = self.pop(offset, op, 2)?;
        let left = self.pop(offset, op, 2)?;
        Ok((left, right))
    }

    // Variables

    fn slot(&mut self, symbol: u8) -> Result<&mut Value, RuntimeError> {
        if !self.variables.contains_key(&symbol)
            && self.variables.len() >= self.config.max_variables
        {
            return Err(RuntimeError::TooManyVariables {
                limit: self.config.max_variables,
            });
        }
        Ok(self.variables.entry(symbol).or_insert(0))
    }
}

fn check_symbol(bc: &Bytecode, index: u8, offset: usize) -> Result<(), RuntimeError> {
    if (index as usize) < bc.symbols.len() {
        Ok(())
    } else {
        Err(RuntimeError::InvalidSymbol { offset, index })
    }
}

/// Resolves a relative jump. `next` is the offset after the operand; landing
/// exactly on the end of the stream is allowed.
fn jump(next: usize, operand: u8, offset: usize, len: usize) -> Result<usize, RuntimeError> {
    let target = next as isize + (operand as i8) as isize;
    if target < 0 || target as usize > len {
        return Err(RuntimeError::InvalidJump { offset, target });
    }
    Ok(target as usize)
}

fn arithmetic(op: OpCode, left: Value, right: Value, offset: usize) -> Result<Value, RuntimeError> {
    let (symbol, result) = match op {
        OpCode::Add => ("+", left.checked_add(right)),
        OpCode::Sub => ("-", left.checked_sub(right)),
        OpCode::Mul => ("*", left.checked_mul(right)),
        OpCode::Div | OpCode::Mod if right == 0 => {
            return Err(RuntimeError::DivisionByZero { offset });
        }
        OpCode::Div => ("/", left.checked_div(right)),
        _ => ("%", left.checked_rem(right)),
    };

    result.ok_or(RuntimeError::IntegerOverflow {
        offset,
        op: symbol,
        left,
        right,
    })
}
