/*!
  A virtual machine for programs made of 15-bit words.

  A binary image is loaded into word memory and either executed by a [`Machine`] or rendered as
  a listing by [`disassemble`]. Both decode through the same instruction table in [`bytecode`].

  ```
  use std::io::Cursor;
  use wordvm::{bytecode::assemble, IoConsole, Machine, Halt};

  let memory  = assemble("SET reg[0] 72\nOUT reg[0]\nHALT").unwrap();
  let console = IoConsole::new(Cursor::new(""), Vec::new(), "");
  let mut machine = Machine::new(memory, console);

  assert_eq!(machine.run().unwrap(), Halt::Instruction { position: 5 });
  assert_eq!(machine.console().writer(), b"H");
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod console;
pub mod disassembler;
pub mod error;
pub mod machine;
pub mod operand;

pub use console::{Console, IoConsole, DEFAULT_PROMPT};
pub use disassembler::{disassemble, Listing};
pub use error::{AssemblyError, ImageError, MachineError};
pub use machine::{Halt, Machine, Status, UnknownOpcode};
pub use operand::{Operand, Word};
