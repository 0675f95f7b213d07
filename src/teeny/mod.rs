use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, prelude::*},
    path::PathBuf,
};

use anyhow::Context;

use emitter::Emitter;
use lexer::Lexer;
use parser::{CompileError, translate};

mod emitter;
mod lexer;
mod parser;

/// What the compiler does with the source once it has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Translate to C and write the output.
    Translate,
    /// Print the token stream and stop.
    Tokens,
    /// Run every check but write nothing.
    Check,
}

/// Where the generated C goes. Files are only created once translation
/// has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    fn open(&self) -> io::Result<Box<dyn Write>> {
        match self {
            Output::Stdout => Ok(Box::new(io::stdout())),
            Output::File(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => write!(f, "<stdout>"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct Compiler<R: Read> {
    mode: Mode,
    input_stream: R,
    output: Output,
}

impl<R: Read> Compiler<R> {
    pub fn new(mode: Mode, input_stream: R, output: Output) -> Self {
        Compiler {
            mode,
            input_stream,
            output,
        }
    }

    pub fn compile(&mut self) -> anyhow::Result<()> {
        let mut src = String::new();
        self.input_stream
            .read_to_string(&mut src)
            .context("Unable to read source")?;
        log::info!("Read {} bytes of source", src.len());

        match self.mode {
            Mode::Tokens => dump_tokens(&src, &mut io::stdout().lock()),
            Mode::Check => {
                translate_source(&src)?;
                log::info!("No errors found");
                Ok(())
            }
            Mode::Translate => {
                let emitter = translate_source(&src)?;
                self.write(emitter)
            }
        }
    }

    fn write(&self, emitter: Emitter) -> anyhow::Result<()> {
        log::debug!(
            "Generated {} header lines and {} body lines",
            emitter.header().lines().count(),
            emitter.body().lines().count()
        );

        let mut writer = self
            .output
            .open()
            .with_context(|| format!("Unable to create {}", self.output))?;

        let written = emitter
            .flush(&mut writer)
            .with_context(|| format!("Unable to write {}", self.output))?;

        log::info!("Wrote {} bytes to {}", written, self.output);
        Ok(())
    }
}

/// Prefixes the error with its class, e.g. `syntax error: line 2: ...`.
fn translate_source(src: &str) -> anyhow::Result<Emitter> {
    translate(src).map_err(|err| {
        let class = err.class();
        anyhow::Error::new(err).context(format!("{} error", class))
    })
}

/// Writes one line per token: line number, kind and source text.
fn dump_tokens(src: &str, writer: &mut dyn Write) -> anyhow::Result<()> {
    let mut lexer = Lexer::new(src);

    while let Some(result) = lexer.next() {
        let token = result.map_err(|source| CompileError::Lex {
            line: lexer.line(),
            source,
        })?;
        writeln!(writer, "{:>4}  {:<8}  {:?}", token.line(), token.kind(), token.text())?;
    }
    Ok(())
}
