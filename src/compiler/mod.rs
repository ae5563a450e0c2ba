//! AST-to-bytecode compiler.
//!
//! Single-pass compilation: walks the AST once, emitting instructions into
//! the current compilation scope. A scope is pushed per function literal;
//! jumps are emitted with a placeholder operand and backpatched once their
//! target offset is known.

mod symbol_table;


pub use symbol_table::{Symbol, SymbolScope, SymbolTable};

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{BlockStmt, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::code::{make, Instructions, OpCode};
use crate::error::CompileError;
use crate::object::builtins::BUILTINS;
use crate::object::{CompiledFunction, Object};

pub type CompileResult<T> = Result<T, CompileError>;

/// Placeholder operand for jumps that get backpatched.
const PLACEHOLDER: usize = 9999;

/// The compiler's record of an instruction it emitted.
#[derive(Debug, Clone, Copy)]
pub struct EmittedInstruction {
    pub opcode: OpCode,
    pub position: usize,
}

/// Instruction buffer for one function body being compiled. The last two
/// emitted instructions are tracked so the tail can be rewritten.
#[derive(Debug, Default)]
struct CompilationScope {
    instructions: Instructions,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

/// Compiler output: instructions plus the shared constant pool.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Rc<RefCell<Vec<Object>>>,
}

/// The compiler: transforms an AST into bytecode.
pub struct Compiler {
    constants: Rc<RefCell<Vec<Object>>>,
    symbol_table: Rc<RefCell<SymbolTable>>,
    scopes: Vec<CompilationScope>,
    scope_index: usize,
}

impl Compiler {
    pub fn new() -> Self {
        let mut symbol_table = SymbolTable::new();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(index, builtin.name);
        }

        Self {
            constants: Rc::new(RefCell::new(Vec::new())),
            symbol_table: Rc::new(RefCell::new(symbol_table)),
            scopes: vec![CompilationScope::default()],
            scope_index: 0,
        }
    }

    /// Create a compiler that continues an existing session: the symbol
    /// table and constant pool persist across REPL lines.
    pub fn new_with_state(
        symbol_table: Rc<RefCell<SymbolTable>>,
        constants: Rc<RefCell<Vec<Object>>>,
    ) -> Self {
        let mut compiler = Self::new();
        compiler.symbol_table = symbol_table;
        compiler.constants = constants;
        compiler
    }

    /// Compile a full program into the current scope.
    pub fn compile(&mut self, program: &Program) -> CompileResult<()> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    /// The finished bytecode for the outermost scope.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[self.scope_index].instructions.clone(),
            constants: Rc::clone(&self.constants),
        }
    }

    fn compile_statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Let { name, value } => {
                // Define before compiling the value so the body of
                // `let f = fn() { f() }` can resolve its own name.
                let symbol = self.symbol_table.borrow_mut().define(name);
                self.compile_expression(value)?;
                match symbol.scope {
                    SymbolScope::Global => self.emit(OpCode::SetGlobal, &[symbol.index]),
                    _ => self.emit(OpCode::SetLocal, &[symbol.index]),
                };
            }
            Stmt::Return { value } => {
                self.compile_expression(value)?;
                self.emit(OpCode::ReturnValue, &[]);
            }
            Stmt::Expression { expr } => {
                self.compile_expression(expr)?;
                self.emit(OpCode::Pop, &[]);
            }
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &BlockStmt) -> CompileResult<()> {
        for stmt in &block.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Identifier(name) => {
                let symbol = self
                    .symbol_table
                    .borrow_mut()
                    .resolve(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.load_symbol(&symbol);
            }

            Expr::IntegerLiteral(value) => {
                let index = self.add_constant(Object::Integer(*value));
                self.emit(OpCode::Constant, &[index]);
            }

            Expr::StringLiteral(value) => {
                let index = self.add_constant(Object::String(Rc::new(value.clone())));
                self.emit(OpCode::Constant, &[index]);
            }

            Expr::BooleanLiteral(value) => {
                if *value {
                    self.emit(OpCode::True, &[]);
                } else {
                    self.emit(OpCode::False, &[]);
                }
            }

            Expr::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator {
                    PrefixOp::Bang => self.emit(OpCode::Bang, &[]),
                    PrefixOp::Minus => self.emit(OpCode::Minus, &[]),
                };
            }

            Expr::Infix {
                operator,
                left,
                right,
            } => {
                // `<` is compiled as `>` with swapped operands to keep the
                // instruction set small.
                if *operator == InfixOp::Less {
                    self.compile_expression(right)?;
                    self.compile_expression(left)?;
                    self.emit(OpCode::GreaterThan, &[]);
                    return Ok(());
                }

                self.compile_expression(left)?;
                self.compile_expression(right)?;
                match operator {
                    InfixOp::Add => self.emit(OpCode::Add, &[]),
                    InfixOp::Sub => self.emit(OpCode::Sub, &[]),
                    InfixOp::Mul => self.emit(OpCode::Mul, &[]),
                    InfixOp::Div => self.emit(OpCode::Div, &[]),
                    InfixOp::Greater => self.emit(OpCode::GreaterThan, &[]),
                    InfixOp::Equal => self.emit(OpCode::Equal, &[]),
                    InfixOp::NotEqual => self.emit(OpCode::NotEqual, &[]),
                    InfixOp::Less => unreachable!("handled above"),
                };
            }

            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                self.compile_expression(condition)?;

                // Backpatched once the consequence length is known.
                let jump_not_truthy_pos = self.emit(OpCode::JumpNotTruthy, &[PLACEHOLDER]);

                self.compile_block(consequence)?;
                if self.last_instruction_is(OpCode::Pop) {
                    self.remove_last_pop();
                }

                let jump_pos = self.emit(OpCode::Jump, &[PLACEHOLDER]);

                let after_consequence = self.current_instructions().len();
                self.change_operand(jump_not_truthy_pos, after_consequence);

                match alternative {
                    None => {
                        self.emit(OpCode::Null, &[]);
                    }
                    Some(alternative) => {
                        self.compile_block(alternative)?;
                        if self.last_instruction_is(OpCode::Pop) {
                            self.remove_last_pop();
                        }
                    }
                }

                let after_alternative = self.current_instructions().len();
                self.change_operand(jump_pos, after_alternative);
            }

            Expr::Function {
                parameters,
                body,
                name,
            } => {
                self.enter_scope();

                if !name.is_empty() {
                    self.symbol_table.borrow_mut().define_function_name(name);
                }
                for parameter in parameters {
                    self.symbol_table.borrow_mut().define(parameter);
                }

                self.compile_block(body)?;

                // A bare final expression becomes the return value; an
                // empty body (or one ending in a let) returns null.
                if self.last_instruction_is(OpCode::Pop) {
                    self.replace_last_pop_with_return();
                }
                if !self.last_instruction_is(OpCode::ReturnValue) {
                    self.emit(OpCode::Return, &[]);
                }

                let (free_symbols, num_locals) = {
                    let table = self.symbol_table.borrow();
                    (table.free_symbols.clone(), table.num_definitions)
                };
                let instructions = self.leave_scope();

                // Push the captured values in capture order, then wrap the
                // function. OpClosure pops them back into the closure.
                for free in &free_symbols {
                    self.load_symbol(free);
                }

                let function = CompiledFunction {
                    instructions,
                    num_locals,
                    num_parameters: parameters.len(),
                };
                let index = self.add_constant(Object::CompiledFunction(Rc::new(function)));
                self.emit(OpCode::Closure, &[index, free_symbols.len()]);
            }

            Expr::Call {
                function,
                arguments,
            } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(OpCode::Call, &[arguments.len()]);
            }

            Expr::Array { elements } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(OpCode::Array, &[elements.len()]);
            }

            Expr::Hash { pairs } => {
                // Sort by the key expression's rendered form so the emitted
                // bytecode is deterministic.
                let mut pairs: Vec<&(Expr, Expr)> = pairs.iter().collect();
                pairs.sort_by_key(|(key, _)| key.to_string());

                for (key, value) in &pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(OpCode::Hash, &[pairs.len() * 2]);
            }

            Expr::Index { left, index } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(OpCode::Index, &[]);
            }
        }
        Ok(())
    }

    /// Emit the load instruction matching a symbol's scope.
    fn load_symbol(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(OpCode::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(OpCode::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(OpCode::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(OpCode::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(OpCode::CurrentClosure, &[]),
        };
    }

    // ===== Constants and emission =====

    /// Append a constant to the pool, returning its index. No deduplication.
    fn add_constant(&mut self, obj: Object) -> usize {
        let mut constants = self.constants.borrow_mut();
        constants.push(obj);
        constants.len() - 1
    }

    /// Encode and append one instruction; returns its byte offset.
    fn emit(&mut self, op: OpCode, operands: &[usize]) -> usize {
        let instruction = make(op, operands);
        let position = self.add_instruction(&instruction);
        self.set_last_instruction(op, position);
        position
    }

    fn add_instruction(&mut self, instruction: &[u8]) -> usize {
        let scope = &mut self.scopes[self.scope_index];
        let position = scope.instructions.len();
        scope.instructions.extend_from_slice(instruction);
        position
    }

    fn set_last_instruction(&mut self, opcode: OpCode, position: usize) {
        let scope = &mut self.scopes[self.scope_index];
        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes[self.scope_index].instructions
    }

    fn last_instruction_is(&self, opcode: OpCode) -> bool {
        let scope = &self.scopes[self.scope_index];
        if scope.instructions.is_empty() {
            return false;
        }
        matches!(scope.last_instruction, Some(last) if last.opcode == opcode)
    }

    /// Drop the trailing OpPop so the block yields its value. Only sound
    /// immediately after emitting it.
    fn remove_last_pop(&mut self) {
        let scope = &mut self.scopes[self.scope_index];
        let last = scope
            .last_instruction
            .expect("remove_last_pop with no emitted instruction");
        scope.instructions.truncate(last.position);
        scope.last_instruction = scope.previous_instruction.take();
    }

    /// Overwrite the instruction at `position` in place. The replacement
    /// must have the same length as the original.
    fn replace_instruction(&mut self, position: usize, new_instruction: &[u8]) {
        let instructions = &mut self.scopes[self.scope_index].instructions;
        instructions[position..position + new_instruction.len()].copy_from_slice(new_instruction);
    }

    /// Turn a trailing OpPop into OpReturnValue, making the function's
    /// final expression its return value. Both are single bytes.
    fn replace_last_pop_with_return(&mut self) {
        let last_position = self.scopes[self.scope_index]
            .last_instruction
            .expect("replace_last_pop_with_return with no emitted instruction")
            .position;
        self.replace_instruction(last_position, &make(OpCode::ReturnValue, &[]));

        if let Some(last) = &mut self.scopes[self.scope_index].last_instruction {
            last.opcode = OpCode::ReturnValue;
        }
    }

    /// Rewrite the operand of the jump at `position` (backpatching).
    fn change_operand(&mut self, position: usize, operand: usize) {
        let opcode = OpCode::from_u8(self.current_instructions()[position])
            .expect("change_operand on invalid opcode");
        let new_instruction = make(opcode, &[operand]);
        self.replace_instruction(position, &new_instruction);
    }

    // ===== Scopes =====

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());
        self.scope_index += 1;

        let enclosed = SymbolTable::new_enclosed(Rc::clone(&self.symbol_table));
        self.symbol_table = Rc::new(RefCell::new(enclosed));
    }

    fn leave_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().expect("leave_scope with no open scope");
        self.scope_index -= 1;

        let outer = self
            .symbol_table
            .borrow()
            .outer
            .clone()
            .expect("leave_scope at the global symbol table");
        self.symbol_table = outer;

        scope.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
