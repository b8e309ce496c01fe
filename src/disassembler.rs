/*!
  Renders memory as a listing, one instruction per line:
  ```text
  0 SET reg[0] 5
  3 OUT reg[0]
  5 HALT
  ```
  Memory is walked linearly from position zero without following jumps, so data words that
  happen to look like opcodes are rendered as instructions, and words that are not opcodes are
  skipped one at a time. A listing of an image with interleaved data can therefore drift out of
  alignment with the real instruction stream.
*/

use log::debug;

use crate::bytecode::{try_decode_instruction, DecodeError};
use crate::operand::Word;

/// Iterator over `(position, line)` pairs of a listing.
pub struct Listing<'a> {
  memory   : &'a [Word],
  position : usize,
}

impl<'a> Listing<'a> {
  pub fn new(memory: &'a [Word]) -> Self {
    Listing { memory, position: 0 }
  }
}

impl<'a> Iterator for Listing<'a> {
  type Item = (usize, String);

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let position = self.position;
      match try_decode_instruction(self.memory, position) {

        Ok(instruction) => {
          self.position += instruction.width();
          return Some((position, format!("{} {}", position, instruction)));
        }

        Err(DecodeError::UnknownOpcode(_)) => {
          self.position += 1;
        }

        Err(DecodeError::Truncated(operation)) => {
          debug!("{} at {} runs past the end of memory, ending listing", operation, position);
          self.position = self.memory.len();
          return None;
        }

        Err(DecodeError::OutOfBounds) => return None,

      }
    }
  }
}

/// The complete listing of `memory` as newline-separated text, without a trailing newline.
pub fn disassemble(memory: &[Word]) -> String {
  Listing::new(memory)
    .map(|(_, line)| line)
    .collect::<Vec<String>>()
    .join("\n")
}
