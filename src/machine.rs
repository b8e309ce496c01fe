//! The execution engine: machine state and the fetch-decode-execute loop.

use std::collections::VecDeque;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use log::{debug, info, trace, warn};
use prettytable::{format as TableFormat, Table};

use crate::bytecode::{load_image, try_decode_instruction, DecodeError, Instruction, Operation};
use crate::console::Console;
use crate::error::{ImageError, MachineError};
use crate::operand::{lvalue, Operand, Word, MAX_LITERAL, MODULUS, REGISTER_COUNT};

/// How a run ended normally.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Halt {
  /// A `HALT` instruction at `position`.
  Instruction { position: usize },
  /// The program counter reached `position`, past the end of memory.
  EndOfProgram { position: usize },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
  Running,
  Halted(Halt),
}

/// A word that was not an opcode, found where one was expected. Execution skipped over it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct UnknownOpcode {
  pub position: usize,
  pub word: Word,
}

/// Where the program counter goes after an instruction.
enum Flow {
  Advance,
  Jump(usize),
  Halt,
}

pub struct Machine<C> {

  // Memory Stores
  memory : Vec<Word>,          // Program and data, mutable through `WMEM`
  stack  : Vec<Word>,          // Pushed values and return addresses
  input  : VecDeque<Word>,     // Characters of the current input line not yet read

  // Registers //
  pc        : usize,                   // Program counter
  registers : [Word; REGISTER_COUNT],  // General purpose registers

  halted          : Option<Halt>,
  unknown_count   : usize,                  // Unknown opcodes skipped so far
  last_unknown    : Option<UnknownOpcode>,
  console         : C,

}

impl<C: Console> Machine<C> {

  // region Display methods

  fn make_register_table<T>(
      name      : &str,
      registers : &[T],
      highlight : Option<usize>
    ) -> Table
    where T: Display
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, value) in registers.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i), format!("{}", value)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i), format!("{}", value)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  // region Construction and accessors

  /// A machine with `memory` loaded at address zero and everything else zeroed.
  pub fn new(memory: Vec<Word>, console: C) -> Machine<C> {
    Machine {
      memory,
      stack       : vec![],
      input       : VecDeque::new(),
      pc          : 0,
      registers   : [0; REGISTER_COUNT],
      halted        : None,
      unknown_count : 0,
      last_unknown  : None,
      console,
    }
  }

  /// Loads a binary image. Malformed images are rejected before anything executes.
  pub fn from_image(bytes: &[u8], console: C) -> Result<Machine<C>, ImageError> {
    let memory = load_image(bytes)?;
    debug!("Loaded {} words from a {} byte image.", memory.len(), bytes.len());
    Ok(Machine::new(memory, console))
  }

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
    &self.registers
  }

  pub fn stack(&self) -> &[Word] {
    &self.stack
  }

  pub fn memory(&self) -> &[Word] {
    &self.memory
  }

  /// How many unknown opcodes have been skipped so far.
  pub fn unknown_opcode_count(&self) -> usize {
    self.unknown_count
  }

  /// The most recently skipped unknown opcode. Each one is also logged when it is skipped.
  pub fn last_unknown_opcode(&self) -> Option<UnknownOpcode> {
    self.last_unknown
  }

  pub fn halted(&self) -> Option<Halt> {
    self.halted
  }

  pub fn console(&self) -> &C {
    &self.console
  }

  pub fn console_mut(&mut self) -> &mut C {
    &mut self.console
  }

  pub fn into_console(self) -> C {
    self.console
  }

  // endregion

  // region Execution

  /// Runs until the program halts or fails.
  pub fn run(&mut self) -> Result<Halt, MachineError> {
    loop {
      if let Status::Halted(halt) = self.step()? {
        info!("Halted: {:?}", halt);
        return Ok(halt);
      }
    }
  }

  /**
    Executes the instruction at the program counter. Stepping a halted machine does nothing and
    reports the same halt again.

    An unknown opcode is not an error: it is recorded, logged, and skipped one word at a time.
  */
  pub fn step(&mut self) -> Result<Status, MachineError> {
    if let Some(halt) = self.halted {
      return Ok(Status::Halted(halt));
    }

    let position = self.pc;
    let instruction =
      match try_decode_instruction(&self.memory, position) {

        Ok(instruction) => instruction,

        Err(DecodeError::OutOfBounds) => {
          return Ok(self.halt(Halt::EndOfProgram { position }));
        }

        Err(DecodeError::UnknownOpcode(word)) => {
          warn!("failed to interpret instruction {} : {}", position, word);
          self.unknown_count += 1;
          self.last_unknown   = Some(UnknownOpcode { position, word });
          self.pc = position + 1;
          return Ok(Status::Running);
        }

        Err(DecodeError::Truncated(operation)) => {
          return Err(MachineError::TruncatedInstruction { position, operation });
        }

      };

    trace!("{} {}", position, instruction);

    let flow = self.execute(position, &instruction)?;

    #[cfg(feature = "trace_computation")] trace!("\n{}", self);

    match flow {
      Flow::Advance        => self.pc = position + instruction.width(),
      Flow::Jump(target)   => self.pc = target,
      Flow::Halt           => return Ok(self.halt(Halt::Instruction { position })),
    }
    Ok(Status::Running)
  }

  fn halt(&mut self, halt: Halt) -> Status {
    debug!("Halting at {}.", self.pc);
    self.halted = Some(halt);
    Status::Halted(halt)
  }

  /**
    Applies the effect of one instruction. The first operand of every instruction that writes a
    register is the target; all other operands are read through `rvalue`. Read operands of a
    conditional jump's target are only resolved when the jump is taken.

    Order-dependent on `Operation`: every opcode must appear here.
  */
  fn execute(&mut self, position: usize, instruction: &Instruction) -> Result<Flow, MachineError> {
    let (a, b, c) =
      match *instruction {
        Instruction::Ternary { a, b, c, .. } => (a, b, c),
        Instruction::Binary { a, b, .. }     => (a, b, 0),
        Instruction::Unary { a, .. }         => (a, 0, 0),
        Instruction::Nullary(_)              => (0, 0, 0),
      };

    let flow =
      match instruction.opcode() {

        Operation::Halt => Flow::Halt,

        Operation::Set => {
          let target = self.target(position, a)?;
          self.registers[target] = self.rvalue(position, b)?;
          Flow::Advance
        }

        Operation::Push => {
          let value = self.rvalue(position, a)?;
          self.stack.push(value);
          Flow::Advance
        }

        Operation::Pop => {
          let target = self.target(position, a)?;
          self.registers[target] = self.pop(position, Operation::Pop)?;
          Flow::Advance
        }

        Operation::Eq => {
          let target = self.target(position, a)?;
          let equal  = self.rvalue(position, b)? == self.rvalue(position, c)?;
          self.registers[target] = equal as Word;
          Flow::Advance
        }

        Operation::Gt => {
          let target  = self.target(position, a)?;
          let greater = self.rvalue(position, b)? > self.rvalue(position, c)?;
          self.registers[target] = greater as Word;
          Flow::Advance
        }

        Operation::Jmp => Flow::Jump(self.rvalue(position, a)? as usize),

        Operation::Jt => {
          match self.rvalue(position, a)? != 0 {
            true  => Flow::Jump(self.rvalue(position, b)? as usize),
            false => Flow::Advance
          }
        }

        Operation::Jf => {
          match self.rvalue(position, a)? == 0 {
            true  => Flow::Jump(self.rvalue(position, b)? as usize),
            false => Flow::Advance
          }
        }

        Operation::Add => {
          let target = self.target(position, a)?;
          let sum    = self.rvalue(position, b)? as u32 + self.rvalue(position, c)? as u32;
          self.registers[target] = (sum % MODULUS) as Word;
          Flow::Advance
        }

        Operation::Mult => {
          let target  = self.target(position, a)?;
          let product = self.rvalue(position, b)? as u32 * self.rvalue(position, c)? as u32;
          self.registers[target] = (product % MODULUS) as Word;
          Flow::Advance
        }

        Operation::Mod => {
          let target  = self.target(position, a)?;
          let divisor = self.rvalue(position, c)?;
          if divisor == 0 {
            return Err(MachineError::DivisionByZero { position });
          }
          self.registers[target] = self.rvalue(position, b)? % divisor;
          Flow::Advance
        }

        Operation::And => {
          let target = self.target(position, a)?;
          self.registers[target] = self.rvalue(position, b)? & self.rvalue(position, c)?;
          Flow::Advance
        }

        Operation::Or => {
          let target = self.target(position, a)?;
          self.registers[target] = self.rvalue(position, b)? | self.rvalue(position, c)?;
          Flow::Advance
        }

        Operation::Not => {
          let target = self.target(position, a)?;
          self.registers[target] = !self.rvalue(position, b)? & MAX_LITERAL;
          Flow::Advance
        }

        Operation::Rmem => {
          let target  = self.target(position, a)?;
          let address = self.rvalue(position, b)? as usize;
          // Code words may be register references; registers only hold 15 bits.
          self.registers[target] = (self.read_memory(position, address)? as u32 % MODULUS) as Word;
          Flow::Advance
        }

        Operation::Wmem => {
          let address = self.rvalue(position, a)? as usize;
          let value   = self.rvalue(position, b)?;
          self.write_memory(position, address, value)?;
          Flow::Advance
        }

        Operation::Call => {
          let target  = self.rvalue(position, a)? as usize;
          let address = position + instruction.width();
          let return_address =
            Word::try_from(address).map_err(|_| {
              MachineError::MemoryOutOfBounds { position, address, length: self.memory.len() }
            })?;
          self.stack.push(return_address);
          Flow::Jump(target)
        }

        Operation::Ret => Flow::Jump(self.pop(position, Operation::Ret)? as usize),

        Operation::Out => {
          let code = self.rvalue(position, a)?;
          let c    =
            match std::char::from_u32(code as u32) {
              Some(c) => c,
              None    => {
                warn!("Output code {} at {} is a lone surrogate, writing U+FFFD", code, position);
                char::REPLACEMENT_CHARACTER
              }
            };
          self.console.write_char(c)?;
          Flow::Advance
        }

        Operation::In => {
          let target = self.target(position, a)?;
          self.registers[target] = self.next_input(position)?;
          Flow::Advance
        }

        Operation::Noop => Flow::Advance,

      };

    Ok(flow)
  }

  // endregion

  // region Operand resolution and storage access

  /// The value of a read operand: literals are themselves, registers are their contents.
  fn rvalue(&self, position: usize, word: Word) -> Result<Word, MachineError> {
    match Operand::from_word(word) {
      Operand::Literal(value)  => Ok(value),
      Operand::Register(index) => Ok(self.registers[index]),
      Operand::Invalid(word)   => Err(MachineError::InvalidOperand { position, word }),
    }
  }

  /// The register index named by a write operand.
  fn target(&self, position: usize, word: Word) -> Result<usize, MachineError> {
    lvalue(word).ok_or(MachineError::InvalidRegister { position, word })
  }

  fn pop(&mut self, position: usize, operation: Operation) -> Result<Word, MachineError> {
    self.stack.pop().ok_or(MachineError::StackUnderflow { position, operation })
  }

  fn read_memory(&self, position: usize, address: usize) -> Result<Word, MachineError> {
    self.memory.get(address).copied().ok_or(
      MachineError::MemoryOutOfBounds { position, address, length: self.memory.len() }
    )
  }

  fn write_memory(&mut self, position: usize, address: usize, value: Word) -> Result<(), MachineError> {
    let length = self.memory.len();
    match self.memory.get_mut(address) {
      Some(cell) => {
        *cell = value;
        Ok(())
      }
      None => Err(MachineError::MemoryOutOfBounds { position, address, length })
    }
  }

  /**
    Takes the next character of input, first asking the console for a whole line if none are
    waiting. The line is queued as UTF-16 code units followed by a newline.
  */
  fn next_input(&mut self, position: usize) -> Result<Word, MachineError> {
    if self.input.is_empty() {
      let line =
        self.console.read_line()?.ok_or(MachineError::InputExhausted { position })?;
      debug!("Read input line {:?}", line);

      for unit in line.encode_utf16() {
        match unit <= MAX_LITERAL {
          true  => self.input.push_back(unit),
          false => {
            warn!("Input character U+{:04X} does not fit in a word, using '?'", unit);
            self.input.push_back('?' as Word);
          }
        }
      }
      self.input.push_back('\n' as Word);
    }

    // The queue always ends with the newline just pushed, so it is not empty here.
    self.input.pop_front().ok_or(MachineError::InputExhausted { position })
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<C: Console> Display for Machine<C> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = Machine::<C>::make_register_table("R", &self.registers, None);
    // The top of the stack is highlighted.
    let s_table = Machine::<C>::make_register_table(
      "S",
      &self.stack,
      self.stack.len().checked_sub(1)
    );

    let mut combined_table = table!([r_table, s_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Stack"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let state = match self.halted {
      Some(_) => "Halted",
      None    => "Running"
    };

    write!(f, "PC: {}\t{}\n{}", self.pc, state, combined_table)
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use proptest::prelude::*;

  use super::*;
  use crate::bytecode::assemble;

  /// Feeds scripted lines and records output and how often a line was requested.
  #[derive(Default)]
  struct ScriptedConsole {
    lines    : VecDeque<String>,
    output   : String,
    requests : usize,
  }

  impl ScriptedConsole {
    fn with_lines(lines: &[&str]) -> Self {
      ScriptedConsole {
        lines: lines.iter().map(|line| line.to_string()).collect(),
        ..Default::default()
      }
    }
  }

  impl Console for ScriptedConsole {
    fn write_char(&mut self, c: char) -> io::Result<()> {
      self.output.push(c);
      Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
      self.requests += 1;
      Ok(self.lines.pop_front())
    }
  }

  fn machine(text: &str) -> Machine<ScriptedConsole> {
    Machine::new(assemble(text).unwrap(), ScriptedConsole::default())
  }

  fn run_to_halt(text: &str) -> Machine<ScriptedConsole> {
    let mut machine = machine(text);
    machine.run().unwrap();
    machine
  }

  #[test]
  fn set_add_out() {
    let machine = run_to_halt("
      SET reg[0] 5
      SET reg[1] 6
      ADD reg[2] reg[0] reg[1]
      ADD reg[3] reg[2] 54
      OUT reg[3]
      OUT '\\n'
      HALT
    ");
    assert_eq!(machine.registers()[..4], [5, 6, 11, 65]);
    assert_eq!(machine.console().output, "A\n");
    assert_eq!(machine.halted(), Some(Halt::Instruction { position: 18 }));
  }

  #[test]
  fn arithmetic_wraps() {
    let machine = run_to_halt("
      ADD reg[0] 32767 32767
      MULT reg[1] 32767 32767
      MULT reg[2] 200 300
      MOD reg[3] 17 5
      AND reg[4] 12 10
      OR reg[5] 12 10
      NOT reg[6] 0
      NOT reg[7] 21845
    ");
    assert_eq!(
      *machine.registers(),
      [32766, 1, (200 * 300) % 32768, 2, 8, 14, 32767, 10922]
    );
  }

  #[test]
  fn comparisons_store_flags() {
    let machine = run_to_halt("
      EQ reg[0] 4 4
      EQ reg[1] 4 5
      GT reg[2] 5 4
      GT reg[3] 4 4
    ");
    assert_eq!(machine.registers()[..4], [1, 0, 1, 0]);
  }

  #[test]
  fn conditional_jumps_pick_branch() {
    // Not taken: advance by exactly three words.
    let mut not_taken = machine("JT reg[0] 100");
    not_taken.step().unwrap();
    assert_eq!(not_taken.pc(), 3);

    let mut taken = machine("SET reg[0] 7\nJT reg[0] 100");
    taken.step().unwrap();
    taken.step().unwrap();
    assert_eq!(taken.pc(), 100);

    let mut jf_taken = machine("JF reg[0] 100");
    jf_taken.step().unwrap();
    assert_eq!(jf_taken.pc(), 100);

    let mut jf_not_taken = machine("SET reg[0] 7\nJF reg[0] 100");
    jf_not_taken.step().unwrap();
    jf_not_taken.step().unwrap();
    assert_eq!(jf_not_taken.pc(), 6);
  }

  #[test]
  fn push_and_pop_are_distinct_from_set() {
    let machine = run_to_halt("
      SET reg[1] 9
      PUSH reg[1]
      PUSH 3
      POP reg[0]
      HALT
    ");
    assert_eq!(machine.registers()[0], 3);
    assert_eq!(machine.stack(), &[9]);
  }

  #[test]
  fn call_returns_after_call() {
    //  0 CALL 6
    //  2 OUT b
    //  4 HALT
    //  6 CALL 11
    //  8 RET
    // 11 OUT a
    // 13 RET
    let mut machine = Machine::new(
      vec![17, 6, 19, 98, 0, 21, 17, 11, 18, 21, 21, 19, 97, 18],
      ScriptedConsole::default()
    );
    machine.step().unwrap();
    assert_eq!(machine.pc(), 6);
    assert_eq!(machine.stack(), &[2]);
    machine.step().unwrap();
    assert_eq!(machine.pc(), 11);
    assert_eq!(machine.stack(), &[2, 8]);
    assert_eq!(machine.run().unwrap(), Halt::Instruction { position: 4 });
    assert_eq!(machine.console().output, "ab");
    assert!(machine.stack().is_empty());
  }

  #[test]
  fn memory_reads_and_writes() {
    let machine = run_to_halt("
      WMEM 7 1234
      RMEM reg[0] 7
      HALT
      NOOP
    ");
    assert_eq!(machine.registers()[0], 1234);
    assert_eq!(machine.memory()[7], 1234);
  }

  #[test]
  fn self_modifying_code_is_executed() {
    // Overwrite the HALT at 3 with a NOOP, then fall off the end.
    let mut machine = machine("WMEM 3 21\nHALT");
    assert_eq!(machine.run().unwrap(), Halt::EndOfProgram { position: 4 });
  }

  #[test]
  fn running_past_the_end_halts() {
    let mut machine = machine("NOOP\nJMP 500");
    assert_eq!(machine.run().unwrap(), Halt::EndOfProgram { position: 500 });
    assert_eq!(machine.step().unwrap(), Status::Halted(Halt::EndOfProgram { position: 500 }));
  }

  #[test]
  fn stack_underflow_is_fatal() {
    match machine("POP reg[0]").run() {
      Err(MachineError::StackUnderflow { position: 0, operation: Operation::Pop }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    match machine("NOOP\nRET").run() {
      Err(MachineError::StackUnderflow { position: 1, operation: Operation::Ret }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn out_of_range_memory_is_fatal() {
    match machine("RMEM reg[0] 30000").run() {
      Err(MachineError::MemoryOutOfBounds { position: 0, address: 30000, length: 3 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    match machine("WMEM 3 1").run() {
      Err(MachineError::MemoryOutOfBounds { position: 0, address: 3, length: 3 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn bad_operands_are_fatal() {
    let mut machine = Machine::new(vec![2, 32776], ScriptedConsole::default());
    match machine.run() {
      Err(MachineError::InvalidOperand { position: 0, word: 32776 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    let mut machine = Machine::new(vec![1, 32776, 0], ScriptedConsole::default());
    match machine.run() {
      Err(MachineError::InvalidRegister { position: 0, word: 32776 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    match self::machine("MOD reg[0] 5 0").run() {
      Err(MachineError::DivisionByZero { position: 0 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    let mut machine = Machine::new(vec![21, 9, 32768], ScriptedConsole::default());
    match machine.run() {
      Err(MachineError::TruncatedInstruction { position: 1, operation: Operation::Add }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn unknown_opcodes_are_skipped() {
    let mut machine = Machine::new(vec![22, 40000, 19, 33, 0], ScriptedConsole::default());
    assert_eq!(machine.run().unwrap(), Halt::Instruction { position: 4 });
    assert_eq!(machine.unknown_opcode_count(), 2);
    assert_eq!(machine.last_unknown_opcode(), Some(UnknownOpcode { position: 1, word: 40000 }));
    assert_eq!(machine.console().output, "!");
  }

  #[test]
  fn input_is_fed_one_character_at_a_time() {
    let mut machine = Machine::new(
      assemble("IN reg[0]\nIN reg[1]\nIN reg[2]\nIN reg[3]\nHALT").unwrap(),
      ScriptedConsole::with_lines(&["hi", "x"])
    );

    machine.step().unwrap();
    machine.step().unwrap();
    assert_eq!(machine.registers()[..2], [104, 105]);
    assert_eq!(machine.console().requests, 1);

    // The line terminator is still queued.
    machine.step().unwrap();
    assert_eq!(machine.registers()[2], 10);
    assert_eq!(machine.console().requests, 1);

    machine.step().unwrap();
    assert_eq!(machine.registers()[3], 'x' as Word);
    assert_eq!(machine.console().requests, 2);
  }

  #[test]
  fn unknown_opcode_loop_keeps_constant_state() {
    // 0: unknown, 1: unknown, 2: JMP 0, forever.
    let mut machine = Machine::new(vec![30, 31, 6, 0], ScriptedConsole::default());
    for _ in 0..3000 {
      assert_eq!(machine.step().unwrap(), Status::Running);
    }
    assert_eq!(machine.unknown_opcode_count(), 2000);
    assert_eq!(machine.last_unknown_opcode(), Some(UnknownOpcode { position: 1, word: 31 }));
  }

  #[test]
  fn memory_words_read_into_registers_stay_in_range() {
    // RMEM reg[0] 1 reads the operand word 32768 itself, then NOT reg[1] reg[0].
    let mut machine = Machine::new(vec![15, 32768, 1, 14, 32769, 32768, 0], ScriptedConsole::default());
    assert_eq!(machine.run().unwrap(), Halt::Instruction { position: 6 });
    assert_eq!(machine.registers()[0], 0);
    assert_eq!(machine.registers()[1], 32767);
    assert!(machine.registers().iter().all(|value| *value <= MAX_LITERAL));
  }

  #[test]
  fn surrogate_output_is_replaced() {
    let mut machine = Machine::new(vec![19, 0xD800, 19, 66], ScriptedConsole::default());
    machine.run().unwrap();
    assert_eq!(machine.console().output, "\u{FFFD}B");
  }

  #[test]
  fn exhausted_input_is_fatal() {
    let mut machine = machine("IN reg[0]\nIN reg[0]");
    machine.console_mut().lines.push_back(String::new());
    match machine.run() {
      Err(MachineError::InputExhausted { position: 2 }) => (),
      other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(machine.registers()[0], 10);
  }

  #[test]
  fn runs_are_reproducible() {
    let text = "
      IN reg[0]
      MULT reg[1] reg[0] 1000
      ADD reg[1] reg[1] reg[0]
      PUSH reg[1]
      WMEM 0 reg[1]
      HALT
    ";
    let run = || {
      let mut machine = Machine::new(assemble(text).unwrap(), ScriptedConsole::with_lines(&["z"]));
      machine.run().unwrap();
      (*machine.registers(), machine.stack().to_vec(), machine.memory().to_vec())
    };
    assert_eq!(run(), run());
  }

  #[test]
  fn displays_state_table() {
    let machine = run_to_halt("PUSH 77\nSET reg[2] 12\nHALT");
    let text = machine.to_string();
    assert!(text.starts_with("PC: 5\tHalted"));
    assert!(text.contains("R[2] ="));
    assert!(text.contains("* --> S[0] ="));
    assert!(text.contains("77"));
  }

  proptest! {
    #[test]
    fn arithmetic_stays_in_range(x in 0u16..32768, y in 0u16..32768) {
      let memory = vec![9, 32768, x, y, 10, 32769, x, y];
      let mut machine = Machine::new(memory, ScriptedConsole::default());
      machine.run().unwrap();
      prop_assert_eq!(machine.registers()[0] as u32, (x as u32 + y as u32) % 32768);
      prop_assert_eq!(machine.registers()[1] as u32, (x as u32 * y as u32) % 32768);
      prop_assert!(machine.registers().iter().all(|value| *value <= MAX_LITERAL));
    }

    #[test]
    fn not_is_an_involution(x in 0u16..32768) {
      let memory = vec![14, 32768, x, 14, 32769, 32768];
      let mut machine = Machine::new(memory, ScriptedConsole::default());
      machine.run().unwrap();
      prop_assert_eq!(machine.registers()[1], x);
      prop_assert!(machine.registers()[0] <= MAX_LITERAL);
    }
  }
}
