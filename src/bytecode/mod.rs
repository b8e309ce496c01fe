/*!

  The VM uses a 16 bit little-endian word size, of which only 15 bits carry values. An
  instruction is one opcode word followed by zero to three operand words, and instructions are
  packed back to back with data interleaved freely:

    Opcode:   0..=21
    Operand:  0..=32767 literal, 32768..=32775 register reference

  An enum is only used for the opcode itself, not the operands. Operands stay raw words until
  the moment they are read, because whether a word is a literal or a register reference is
  decided when it is resolved, and the same words are rendered by the disassembler.

  Both the execution engine and the disassembler decode through `try_decode_instruction`, so the
  two cannot disagree about operand counts or mnemonics.

*/

mod binary;
mod instruction;
mod assembly;

pub use binary::{load_image, encode_image, try_decode_instruction, DecodeError};
pub use instruction::{format_char, Instruction, Operation};
pub use assembly::{assemble, parse_assembly};
