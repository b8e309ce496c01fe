/*!
  This module is responsible for loading binary images into word memory and for decoding
  instructions out of memory.

*/
use std::convert::TryFrom;

use super::{Operation, Instruction};
use crate::error::ImageError;
use crate::operand::Word;

/// Why a position in memory could not be read as an instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
  /// The position is past the end of memory.
  OutOfBounds,
  /// The word at the position is not an opcode.
  UnknownOpcode(Word),
  /// The opcode is valid but memory ends before all of its operands.
  Truncated(Operation)
}

/**
  Reinterprets a byte image as little-endian 16-bit words. The whole image is loaded starting at
  address zero; there is no header.
*/
pub fn load_image(bytes: &[u8]) -> Result<Vec<Word>, ImageError> {
  if bytes.is_empty() {
    return Err(ImageError::Empty);
  }
  if bytes.len() % 2 != 0 {
    return Err(ImageError::OddLength(bytes.len()));
  }

  let words =
    bytes
      .chunks_exact(2)
      .map(|pair| Word::from_le_bytes([pair[0], pair[1]]))
      .collect();
  Ok(words)
}

/// Encodes words as a little-endian byte image, the inverse of `load_image`.
pub fn encode_image(words: &[Word]) -> Vec<u8> {
  words.iter().flat_map(|word| word.to_le_bytes().to_vec()).collect()
}

/// Decodes the instruction whose opcode is at `position`.
pub fn try_decode_instruction(memory: &[Word], position: usize) -> Result<Instruction, DecodeError> {
  let word = *memory.get(position).ok_or(DecodeError::OutOfBounds)?;
  let opcode =
    Operation::try_from(word).map_err(|_| DecodeError::UnknownOpcode(word))?;

  let operands =
    memory
      .get(position + 1..position + opcode.width())
      .ok_or(DecodeError::Truncated(opcode))?;

  // The slice length always equals the arity here.
  Instruction::from_parts(opcode, operands).ok_or(DecodeError::Truncated(opcode))
}
