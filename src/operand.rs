//! An `Either` type that holds either a literal value or a reference to a register, with some
//! convenience functions.

use std::fmt::{Display, Formatter};

/// The machine's storage unit. Only the low 15 bits carry values; words in `32768..=32775`
/// name registers.
pub type Word = u16;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;
/// Values are 15 bits wide; every arithmetic result is taken modulo this.
pub const MODULUS: u32 = 32768;
/// The largest literal value, also the 15-bit complement mask.
pub const MAX_LITERAL: Word = 32767;
/// The first word that is a register reference rather than a literal.
pub const REGISTER_BASE: Word = 32768;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Operand {
  /// A value used as is.
  Literal(Word),
  /// An index into the register bank, always in `0..REGISTER_COUNT`.
  Register(usize),
  /// A word at or above `32776`. Well formed programs never contain these.
  Invalid(Word)
}

impl Operand {

  /// Classifies a raw word from memory.
  pub fn from_word(word: Word) -> Operand {
    match word {
      w if w < REGISTER_BASE                              => Operand::Literal(w),
      w if ((w - REGISTER_BASE) as usize) < REGISTER_COUNT => Operand::Register((w - REGISTER_BASE) as usize),
      w                                                   => Operand::Invalid(w)
    }
  }

  /// The raw word this operand was decoded from.
  pub fn to_word(&self) -> Word {
    match self {
      Operand::Literal(value)  => *value,
      Operand::Register(index) => REGISTER_BASE + *index as Word,
      Operand::Invalid(word)   => *word
    }
  }

  pub fn from_reg_idx(reg_idx: usize) -> Operand {
    Operand::from_word(REGISTER_BASE + reg_idx as Word)
  }

}

/// The target of a write: the word taken modulo `32768`. Returns `None` when the result is not a
/// register index.
pub fn lvalue(word: Word) -> Option<usize> {
  let index = (word as u32 % MODULUS) as usize;
  match index < REGISTER_COUNT {
    true  => Some(index),
    false => None
  }
}

/// Listing form: literals in decimal, registers as `reg[n]`. Invalid words are shown by their
/// residue, which is what a reader of the raw image would expect to see.
impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operand::Literal(value) => {
        write!(f, "{}", value)
      },
      Operand::Register(index) => {
        write!(f, "reg[{}]", index)
      },
      Operand::Invalid(word) => {
        write!(f, "reg[{}]", *word as u32 % MODULUS)
      }
    }
  }
}
