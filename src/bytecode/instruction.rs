use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::operand::{Operand, Word};

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is the opcode's numeric value in memory, so the order the
  opcodes are listed below is significant. Mnemonics are the upper-cased variant names.
  Order-dependencies:
      ```
      Operation::arity()
      Machine::execute()
      ```
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u16)]
pub enum Operation {
  Halt = 0,  // halt
  Set,       // set( a, b )
  Push,      // push( a )
  Pop,       // pop( a )
  Eq,        // eq( a, b, c )
  Gt,        // gt( a, b, c )
  Jmp,       // jmp( a )
  Jt,        // jt( a, b )
  Jf,        // jf( a, b )
  Add,       // add( a, b, c )
  Mult,      // mult( a, b, c )
  Mod,       // mod( a, b, c )
  And,       // and( a, b, c )
  Or,        // or( a, b, c )
  Not,       // not( a, b )
  Rmem,      // rmem( a, b )
  Wmem,      // wmem( a, b )
  Call,      // call( a )
  Ret,       // ret
  Out,       // out( a )
  In,        // in( a )
  Noop = 21, // noop
}

impl Operation {
  pub fn code(&self) -> Word {
    Into::<Word>::into(*self)
  }

  /// Number of operand words following the opcode.
  pub fn arity(&self) -> usize {
    match self {
      | Operation::Halt
      | Operation::Ret
      | Operation::Noop => 0,

      | Operation::Push
      | Operation::Pop
      | Operation::Jmp
      | Operation::Call
      | Operation::Out
      | Operation::In   => 1,

      | Operation::Set
      | Operation::Jt
      | Operation::Jf
      | Operation::Not
      | Operation::Rmem
      | Operation::Wmem => 2,

      | Operation::Eq
      | Operation::Gt
      | Operation::Add
      | Operation::Mult
      | Operation::Mod
      | Operation::And
      | Operation::Or   => 3,
    }
  }

  /// Number of words the instruction occupies, opcode included.
  pub fn width(&self) -> usize {
    1 + self.arity()
  }
}

/// Holds the undecoded operand words of an instruction. As such, it enumerates the possible
/// operand counts.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode][a][b][c]
  Ternary {
    opcode: Operation,
    a: Word,
    b: Word,
    c: Word
  },
  /// [OpCode][a][b]
  Binary {
    opcode: Operation,
    a: Word,
    b: Word
  },
  /// [OpCode][a]
  Unary {
    opcode: Operation,
    a: Word
  },
  /// [OpCode]
  Nullary(Operation),
}

impl Instruction {

  /// Builds an instruction from an opcode and its operand words. Returns `None` if the number
  /// of operands does not match the opcode's arity.
  pub fn from_parts(opcode: Operation, operands: &[Word]) -> Option<Instruction> {
    if operands.len() != opcode.arity() {
      return None;
    }
    let instruction =
      match operands {
        []        => Instruction::Nullary(opcode),
        [a]       => Instruction::Unary { opcode, a: *a },
        [a, b]    => Instruction::Binary { opcode, a: *a, b: *b },
        [a, b, c] => Instruction::Ternary { opcode, a: *a, b: *b, c: *c },
        _         => return None
      };
    Some(instruction)
  }

  pub fn opcode(&self) -> Operation {
    match self {
      | Instruction::Ternary { opcode, .. }
      | Instruction::Binary { opcode, .. }
      | Instruction::Unary { opcode, .. }
      | Instruction::Nullary(opcode) => *opcode
    }
  }

  /// The raw operand words in order.
  pub fn operands(&self) -> Vec<Word> {
    match self {
      Instruction::Ternary { a, b, c, .. } => vec![*a, *b, *c],
      Instruction::Binary { a, b, .. }     => vec![*a, *b],
      Instruction::Unary { a, .. }         => vec![*a],
      Instruction::Nullary(_)              => vec![]
    }
  }

  pub fn width(&self) -> usize {
    self.opcode().width()
  }

  /// The instruction as it is laid out in memory.
  pub fn words(&self) -> Vec<Word> {
    let mut words = vec![self.opcode().code()];
    words.extend(self.operands());
    words
  }

}

/// Renders the operand of `OUT`: literals become the character they encode, with a newline
/// escaped as `\n`.
pub fn format_char(word: Word) -> String {
  match Operand::from_word(word) {
    Operand::Literal(value) => {
      match std::char::from_u32(value as u32) {
        Some('\n') => "\\n".to_string(),
        Some(c)    => c.to_string(),
        None       => char::REPLACEMENT_CHARACTER.to_string()
      }
    }
    operand => operand.to_string()
  }
}

/// Listing form without the position prefix, e.g. `ADD reg[0] reg[1] 4`.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Unary { opcode: Operation::Out, a } => {
        write!(f, "{} {}", Operation::Out, format_char(*a))
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

      instruction => {
        write!(f, "{}", instruction.opcode())?;
        for word in instruction.operands() {
          write!(f, " {}", Operand::from_word(word))?;
        }
        Ok(())
      }

    }
  }
}
