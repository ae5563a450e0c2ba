//! Call frames for the virtual machine.

use std::rc::Rc;

use crate::code::Instructions;
use crate::object::Closure;

/// One entry in the VM's call stack.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The closure being executed.
    pub closure: Rc<Closure>,
    /// Instruction pointer. Starts at -1: the dispatch loop pre-increments
    /// before every fetch, and jumps store `target - 1`.
    pub ip: isize,
    /// Operand-stack index of this frame's first local slot.
    pub base_pointer: usize,
}

impl Frame {
    pub fn new(closure: Rc<Closure>, base_pointer: usize) -> Self {
        Self {
            closure,
            ip: -1,
            base_pointer,
        }
    }

    pub fn instructions(&self) -> &Instructions {
        &self.closure.function.instructions
    }
}
