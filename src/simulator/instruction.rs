// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// instruction.rs
//
// This file contains the decoded instruction record produced by the
// assembler, together with the operation and register-name types shared by
// the scheduler and the reservation stations.

use std::fmt;

/// Floating-point operations understood by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Load,
    Store,
}

impl Operation {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operation::Add => "fadd",
            Operation::Sub => "fsub",
            Operation::Mul => "fmul",
            Operation::Div => "fdiv",
            Operation::Load => "flw",
            Operation::Store => "fsw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A register operand: a floating-point register `f0..f31`, an address
/// register `x0..x31`, or no operand at all (stores have no destination,
/// loads have no second source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    None,
    F(u8),
    X(u8),
}

impl Register {
    pub fn is_none(&self) -> bool {
        matches!(self, Register::None)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::None => Ok(()),
            Register::F(index) => write!(f, "f{}", index),
            Register::X(index) => write!(f, "x{}", index),
        }
    }
}

/// An immutable decoded instruction.
///
/// Operand placement follows the assembly syntax: for arithmetic the fields
/// are `(destination, source1, source2)`; for `flw` the address register
/// lands in `source1`; for `fsw` the data register is `source1` and the
/// address register is `source2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub raw_text: String,
    pub operation: Operation,
    pub destination: Register,
    pub source1: Register,
    pub source2: Register,
    pub offset: Option<i32>,
}

impl Instruction {
    pub fn is_load(&self) -> bool {
        self.operation == Operation::Load
    }

    pub fn is_store(&self) -> bool {
        self.operation == Operation::Store
    }

    pub fn is_load_store(&self) -> bool {
        self.is_load() || self.is_store()
    }

    pub fn is_add_sub(&self) -> bool {
        matches!(self.operation, Operation::Add | Operation::Sub)
    }

    pub fn is_mul_div(&self) -> bool {
        matches!(self.operation, Operation::Mul | Operation::Div)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_text)
    }
}
