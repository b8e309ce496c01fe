/*!
  The human readable textual form of bytecode is called assembly. It is the same text the
  disassembler produces, so a listing can be edited and assembled again. This module leverages
  the `strum` derives of `Operation` to turn mnemonics back into opcodes.

  One instruction per line:
  ```text
  [position] MNEMONIC operand* [# comment]
  ```
  The leading position is ignored. An operand is a decimal literal, a register `reg[n]`, a
  character literal `'c'`, or `\n`. For `OUT`, a single bare character is read as that
  character, which is how the disassembler renders it.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{
    alpha1,
    anychar,
    char as one_char,
    digit1,
    not_line_ending,
    space0,
    space1
  },
  combinator::{all_consuming, map, opt, value},
  multi::many0,
  sequence::{delimited, preceded, terminated, tuple},
  IResult
};

use crate::bytecode::{Instruction, Operation};
use crate::error::AssemblyError;
use crate::operand::{Operand, Word, MAX_LITERAL, REGISTER_COUNT};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token<'a> {
  Number(&'a str),
  Register(&'a str),
  Char(char)
}

fn register_p(input: &str) -> IResult<&str, Token> {
  map(delimited(tag("reg["), digit1, one_char(']')), Token::Register)(input)
}

fn char_literal_p(input: &str) -> IResult<&str, Token> {
  map(
    delimited(one_char('\''), alt((value('\n', tag("\\n")), anychar)), one_char('\'')),
    Token::Char
  )(input)
}

fn operand_p(input: &str) -> IResult<&str, Token> {
  alt((
    register_p,
    char_literal_p,
    value(Token::Char('\n'), tag("\\n")),
    map(digit1, Token::Number)
  ))(input)
}

fn comment_p(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), not_line_ending)(input)
}

/// Skips the optional position and returns the mnemonic.
fn header_p(input: &str) -> IResult<&str, &str> {
  preceded(tuple((space0, opt(terminated(digit1, space1)))), alpha1)(input)
}

fn operands_p(input: &str) -> IResult<&str, Vec<Token>> {
  all_consuming(
    terminated(
      many0(preceded(space1, operand_p)),
      tuple((space0, opt(comment_p)))
    )
  )(input)
}

/// The listing renders `OUT`'s operand as the bare character, which may be a space or `#`.
fn out_character(rest: &str) -> Option<Token> {
  let mut chars = rest.chars();
  match (chars.next(), chars.next(), chars.next()) {
    (Some(' '), Some(c), None) => Some(Token::Char(c)),
    _ => None
  }
}

fn token_to_word(token: &Token, line: usize) -> Result<Word, AssemblyError> {
  let out_of_range = |text: String| AssemblyError::ValueOutOfRange { line, value: text };

  match token {
    Token::Number(text) => {
      match text.parse::<u32>() {
        Ok(value) if value <= MAX_LITERAL as u32 => Ok(value as Word),
        _ => Err(out_of_range(text.to_string()))
      }
    }
    Token::Register(text) => {
      match text.parse::<usize>() {
        Ok(index) if index < REGISTER_COUNT => Ok(Operand::from_reg_idx(index).to_word()),
        _ => Err(out_of_range(format!("reg[{}]", text)))
      }
    }
    Token::Char(c) => {
      match *c as u32 {
        code if code <= MAX_LITERAL as u32 => Ok(code as Word),
        _ => Err(out_of_range(format!("'{}'", c)))
      }
    }
  }
}

fn parse_line(text: &str, line: usize) -> Result<Instruction, AssemblyError> {
  let syntax_error = || AssemblyError::Syntax { line, text: text.trim().to_string() };

  let (rest, name) = header_p(text).map_err(|_| syntax_error())?;
  let operation =
    Operation::from_str(&name.to_ascii_uppercase())
      .map_err(|_| AssemblyError::NotAnOperation { line, name: name.to_string() })?;

  let tokens =
    match (operation, out_character(rest)) {
      (Operation::Out, Some(token)) => vec![token],
      _ => operands_p(rest).map_err(|_| syntax_error())?.1
    };

  let words =
    tokens
      .iter()
      .map(|token| token_to_word(token, line))
      .collect::<Result<Vec<Word>, AssemblyError>>()?;

  Instruction::from_parts(operation, &words).ok_or(
    AssemblyError::WrongArity {
      line,
      operation,
      expected: operation.arity(),
      found: words.len()
    }
  )
}

/// Parses assembly text into instructions. Blank lines and comment lines are skipped; line
/// numbers in errors count from 1.
pub fn parse_assembly(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  text
    .lines()
    .enumerate()
    .filter(|(_, line)| {
      let trimmed = line.trim_start();
      !(trimmed.is_empty() || trimmed.starts_with('#'))
    })
    .map(|(index, line)| parse_line(line, index + 1))
    .collect()
}

/// Parses assembly text straight to the words of a memory image.
pub fn assemble(text: &str) -> Result<Vec<Word>, AssemblyError> {
  Ok(
    parse_assembly(text)?
      .iter()
      .flat_map(Instruction::words)
      .collect()
  )
}
