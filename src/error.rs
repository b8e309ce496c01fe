//! Error types for loading, assembling, and executing programs.

use thiserror::Error;

use crate::bytecode::Operation;
use crate::operand::Word;

/// The byte image cannot be turned into word memory.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ImageError {
  #[error("image is empty")]
  Empty,
  /// Words are two bytes wide, so the image is truncated mid-word.
  #[error("image has an odd length of {0} bytes")]
  OddLength(usize),
}

/// Fatal conditions that stop a run. A normal halt is never one of these.
#[derive(Debug, Error)]
pub enum MachineError {
  /// `POP` or `RET` with nothing on the stack.
  #[error("stack underflow at {position}: {operation} on an empty stack")]
  StackUnderflow {
    position: usize,
    operation: Operation,
  },
  #[error("memory access out of range at {position}: address {address} is past the end of {length} words")]
  MemoryOutOfBounds {
    position: usize,
    address: usize,
    length: usize,
  },
  /// The write target is not one of the eight registers.
  #[error("invalid register operand at {position}: {word}")]
  InvalidRegister {
    position: usize,
    word: Word,
  },
  /// A read operand is neither a literal nor a register reference.
  #[error("invalid operand at {position}: {word}")]
  InvalidOperand {
    position: usize,
    word: Word,
  },
  /// Memory ends before the operands of the instruction.
  #[error("truncated {operation} instruction at {position}")]
  TruncatedInstruction {
    position: usize,
    operation: Operation,
  },
  #[error("division by zero at {position}")]
  DivisionByZero {
    position: usize,
  },
  /// The console has no more input lines to give.
  #[error("input exhausted at {position}")]
  InputExhausted {
    position: usize,
  },
  #[error("console I/O failed: {0}")]
  Io(#[from] std::io::Error),
}

/// The text could not be assembled.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AssemblyError {
  #[error("line {line}: could not parse `{text}`")]
  Syntax {
    line: usize,
    text: String,
  },
  #[error("line {line}: {name} is not an operation")]
  NotAnOperation {
    line: usize,
    name: String,
  },
  #[error("line {line}: {operation} requires {expected} operands but was given {found}")]
  WrongArity {
    line: usize,
    operation: Operation,
    expected: usize,
    found: usize,
  },
  #[error("line {line}: {value} does not fit in a word")]
  ValueOutOfRange {
    line: usize,
    value: String,
  },
}
