use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use wordvm::bytecode::{assemble, encode_image, load_image};
use wordvm::{disassemble, IoConsole, Machine, DEFAULT_PROMPT};

#[derive(Parser)]
#[command(name = "wordvm", about = "Run or disassemble 15-bit word machine images")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Execute an image against the terminal.
  Run {
    #[clap(help = "Binary image")]
    image: PathBuf,

    #[clap(long, default_value = DEFAULT_PROMPT, help = "Prompt shown when the program waits for input")]
    prompt: String,

    #[clap(long, help = "Print registers and stack after the run")]
    dump_state: bool,
  },
  /// Write a linear listing of an image.
  Disasm {
    #[clap(help = "Binary image")]
    image: PathBuf,

    #[clap(short, long, default_value = "disassembled.txt", help = "Listing output file")]
    output: PathBuf,
  },
  /// Assemble a listing into an image.
  Asm {
    #[clap(help = "Assembly source")]
    source: PathBuf,

    #[clap(short, long, help = "Image output file")]
    output: PathBuf,
  },
}

fn read(path: &PathBuf) -> Result<Vec<u8>> {
  fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

  match Cli::parse().command {

    Command::Run { image, prompt, dump_state } => {
      let bytes   = read(&image)?;
      let console = IoConsole::stdio(&prompt);
      let mut machine = Machine::from_image(&bytes, console)
        .with_context(|| format!("loading {}", image.display()))?;

      let result = machine.run();
      if dump_state {
        eprintln!("{}", machine);
      }
      let halt = result?;
      info!("{} finished: {:?}", image.display(), halt);
    }

    Command::Disasm { image, output } => {
      let memory  = load_image(&read(&image)?)
        .with_context(|| format!("loading {}", image.display()))?;
      fs::write(&output, disassemble(&memory))
        .with_context(|| format!("writing {}", output.display()))?;
      info!("Wrote listing of {} words to {}", memory.len(), output.display());
    }

    Command::Asm { source, output } => {
      let text  = fs::read_to_string(&source)
        .with_context(|| format!("reading {}", source.display()))?;
      let words = assemble(&text).with_context(|| format!("assembling {}", source.display()))?;
      fs::write(&output, encode_image(&words))
        .with_context(|| format!("writing {}", output.display()))?;
      info!("Assembled {} words into {}", words.len(), output.display());
    }

  }

  Ok(())
}
