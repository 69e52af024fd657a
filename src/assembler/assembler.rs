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

// assembler.rs
//
// This file contains the assembler for the floating-point subset understood
// by the simulator. It tokenizes free-form source text, validates each
// non-empty line, and produces the decoded instruction list, reporting the
// first offending line on failure.

use crate::errors::SimulatorError;
use crate::simulator::instruction::{Instruction, Operation, Register};

/// Assemble source text into a list of decoded instructions.
///
/// One instruction per line, four tokens per instruction, case-insensitive.
/// Arithmetic (`fadd fsub fmul fdiv`) takes three floating-point registers;
/// `flw fD, imm(xA)` and `fsw fS, imm(xA)` take a floating-point register,
/// an integer offset, and an address register. Empty lines are skipped.
/// The first invalid line aborts assembly with its 1-based line number.
pub fn assemble(source: &str) -> Result<Vec<Instruction>, SimulatorError> {
    let mut instructions = Vec::new();
    for (line_number, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim().to_lowercase();
        let tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }
        match parse_line(&line, &tokens) {
            Some(instruction) => instructions.push(instruction),
            None => {
                return Err(SimulatorError::AssemblyError {
                    line: line_number + 1,
                })
            },
        }
    }
    Ok(instructions)
}

/// Split a line on anything that is not a word character, keeping a leading
/// minus sign attached to negative offsets.
fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_line(line: &str, tokens: &[&str]) -> Option<Instruction> {
    if tokens.len() != 4 {
        return None;
    }
    let operation = parse_operation(tokens[0])?;
    match operation {
        Operation::Add | Operation::Sub | Operation::Mul | Operation::Div => Some(Instruction {
            raw_text: line.to_string(),
            operation,
            destination: parse_f_register(tokens[1])?,
            source1: parse_f_register(tokens[2])?,
            source2: parse_f_register(tokens[3])?,
            offset: None,
        }),
        Operation::Load => Some(Instruction {
            raw_text: line.to_string(),
            operation,
            destination: parse_f_register(tokens[1])?,
            source1: parse_x_register(tokens[3])?,
            source2: Register::None,
            offset: Some(parse_offset(tokens[2])?),
        }),
        Operation::Store => Some(Instruction {
            raw_text: line.to_string(),
            operation,
            destination: Register::None,
            source1: parse_f_register(tokens[1])?,
            source2: parse_x_register(tokens[3])?,
            offset: Some(parse_offset(tokens[2])?),
        }),
    }
}

fn parse_operation(token: &str) -> Option<Operation> {
    match token {
        "fadd" => Some(Operation::Add),
        "fsub" => Some(Operation::Sub),
        "fmul" => Some(Operation::Mul),
        "fdiv" => Some(Operation::Div),
        "flw" => Some(Operation::Load),
        "fsw" => Some(Operation::Store),
        _ => None,
    }
}

fn parse_f_register(token: &str) -> Option<Register> {
    parse_register_index(token, 'f').map(Register::F)
}

fn parse_x_register(token: &str) -> Option<Register> {
    parse_register_index(token, 'x').map(Register::X)
}

/// Register names are the prefix followed by 0..=31, without leading zeros.
fn parse_register_index(token: &str, prefix: char) -> Option<u8> {
    let digits = token.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let index: u8 = digits.parse().ok()?;
    (index <= 31).then_some(index)
}

fn parse_offset(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
