use crate::{
    bytecode::{Bytecode, OpCode, compile_error::CompileError},
    frontend::token::Span,
    lang::{
        node::{BinaryOp, Block, Expr, Literal, Stmt},
        program::Program,
    },
};

/// Single-pass, depth-first lowering of a `Program` into `Bytecode`.
pub struct Compiler {
    /// Output bytecode program
    bytecode: Bytecode,
}

/// Compiles a parsed program. The result always ends with `Halt`.
pub fn compile(program: &Program) -> Result<Bytecode, CompileError> {
    Compiler::new().compile_program(program)
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            bytecode: Bytecode::new(),
        }
    }

    pub fn compile_program(mut self, program: &Program) -> Result<Bytecode, CompileError> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        self.bytecode.emit_op(OpCode::Halt);

        log::debug!(
            "compiled {} statements ({} function declarations skipped) into {} bytes ({} constants, {} symbols)",
            program.statements.len(),
            program.functions().count(),
            self.bytecode.len(),
            self.bytecode.constants.len(),
            self.bytecode.symbols.len()
        );

        Ok(self.bytecode)
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            // The value stays on the stack; nothing pops it.
            Stmt::Expr { expr, .. } => self.compile_expr(expr),

            Stmt::Assign { name, value, .. } => {
                self.compile_expr(value)?;
                let idx = self.bytecode.intern_symbol(name)?;
                self.bytecode.emit_op_operand(OpCode::Store, idx);
                Ok(())
            }

            Stmt::If {
                cond,
                then_block,
                else_block,
                span,
            } => {
                self.compile_expr(cond)?;
                let jump_if_false = self.emit_jump(OpCode::JumpIfFalse);
                self.compile_block(then_block)?;
                let jump_over_else = self.emit_jump(OpCode::Jump);
                self.patch_jump(jump_if_false, "if", *span)?;
                if let Some(else_block) = else_block {
                    self.compile_block(else_block)?;
                }
                self.patch_jump(jump_over_else, "if", *span)
            }

            Stmt::While { cond, body, span } => {
                let loop_start = self.bytecode.len();
                self.compile_expr(cond)?;
                let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
                self.compile_block(body)?;
                self.emit_loop(loop_start, *span)?;
                self.patch_jump(exit_jump, "while", *span)
            }

            Stmt::Return { value, .. } => {
                self.compile_expr(value)?;
                self.bytecode.emit_op(OpCode::Return);
                Ok(())
            }

            Stmt::Function { name, params, .. } => {
                log::debug!(
                    "function '{}' ({} params) is not lowered to bytecode",
                    name,
                    params.len()
                );
                Ok(())
            }
        }
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal {
                value: Literal::Integer(n),
                ..
            } => {
                let idx = self.bytecode.add_constant(*n)?;
                self.bytecode.emit_op_operand(OpCode::Constant, idx);
                Ok(())
            }

            Expr::Literal {
                value: Literal::Str(_),
                span,
            } => Err(CompileError::string_literal(*span)),

            Expr::Variable { name, .. } => {
                let idx = self.bytecode.intern_symbol(name)?;
                self.bytecode.emit_op_operand(OpCode::Load, idx);
                Ok(())
            }

            // Left then right, so the VM pops the right operand first.
            Expr::Binary {
                op, left, right, ..
            } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.bytecode.emit_op(binary_opcode(*op));
                Ok(())
            }

            Expr::Call { name, args, .. } => match args.as_slice() {
                [arg] if name == "print" => {
                    self.compile_expr(arg)?;
                    self.bytecode.emit_op(OpCode::Print);
                    Ok(())
                }
                _ => {
                    log::debug!(
                        "call to '{}' with {} arguments is not lowered to bytecode",
                        name,
                        args.len()
                    );
                    Ok(())
                }
            },
        }
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    /// Emits a jump with a placeholder offset and returns the offset's
    /// position for `patch_jump`.
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.bytecode.emit_op_operand(op, 0);
        self.bytecode.len() - 1
    }

    /// Points the jump whose operand sits at `operand_at` to the current end
    /// of the instruction stream.
    fn patch_jump(
        &mut self,
        operand_at: usize,
        construct: &'static str,
        span: Span,
    ) -> Result<(), CompileError> {
        let distance = self.bytecode.len() as isize - (operand_at as isize + 1);
        let offset = encode_offset(distance, construct, span)?;
        self.bytecode.patch(operand_at, offset);
        Ok(())
    }

    /// Emits a backward jump landing exactly on `loop_start`.
    fn emit_loop(&mut self, loop_start: usize, span: Span) -> Result<(), CompileError> {
        // Offsets are relative to the byte after the operand.
        let after_operand = self.bytecode.len() + 2;
        let distance = loop_start as isize - after_operand as isize;
        let offset = encode_offset(distance, "while", span)?;
        self.bytecode.emit_op_operand(OpCode::Jump, offset);
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes a relative jump distance as a signed operand byte.
fn encode_offset(distance: isize, construct: &'static str, span: Span) -> Result<u8, CompileError> {
    i8::try_from(distance)
        .map(|offset| offset as u8)
        .map_err(|_| CompileError::JumpTooFar {
            construct,
            distance,
            span,
        })
}

fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Gt => OpCode::Gt,
        BinaryOp::Lt => OpCode::Lt,
        BinaryOp::GtEq => OpCode::GtEq,
        BinaryOp::LtEq => OpCode::LtEq,
        BinaryOp::Eq => OpCode::Eq,
        BinaryOp::NotEq => OpCode::NotEq,
    }
}
