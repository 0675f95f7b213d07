use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::Parser;

use teeny::{Compiler, Mode, Output};

mod teeny;

#[derive(Parser, Debug)]
#[command(version, about = "Translates Teeny Tiny programs to C", long_about = None)]
struct Cli {
    /// Sets the input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Sets the output file ('-' for stdout)
    #[arg(short, long, value_name = "FILE", default_value = "out.c")]
    output: PathBuf,

    /// Print the token stream instead of translating
    #[arg(long, conflicts_with = "check")]
    tokens: bool,

    /// Check the program without writing any output
    #[arg(long)]
    check: bool,

    /// Disables colorized output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        match (self.tokens, self.check) {
            (true, _) => Mode::Tokens,
            (_, true) => Mode::Check,
            _ => Mode::Translate,
        }
    }

    fn output(&self) -> Output {
        if self.output.as_os_str() == "-" {
            Output::Stdout
        } else {
            Output::File(self.output.clone())
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let input_stream = BufReader::new(
        File::open(&cli.input)
            .with_context(|| format!("Unable to open {}", cli.input.display()))?,
    );

    let mut compiler = Compiler::new(cli.mode(), input_stream, cli.output());
    compiler.compile()
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = loggerv::Logger::new()
        .verbosity(cli.verbosity as u64)
        .colors(!cli.no_color)
        .module_path(false)
        .init()
    {
        eprintln!("Unable to initialize logging: {}", err);
    }

    if let Err(err) = run(&cli) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["teeny", "hello.teeny"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("hello.teeny"));
        assert_eq!(cli.mode(), Mode::Translate);
        assert_eq!(cli.output(), Output::File(PathBuf::from("out.c")));
        assert_eq!(cli.verbosity, 0);
    }

    #[test]
    fn test_cli_stdout_and_verbosity() {
        let cli = Cli::try_parse_from(["teeny", "-vv", "-o", "-", "hello.teeny"]).unwrap();
        assert_eq!(cli.output(), Output::Stdout);
        assert_eq!(cli.verbosity, 2);
    }

    #[test]
    fn test_cli_modes() {
        let cli = Cli::try_parse_from(["teeny", "--tokens", "a.teeny"]).unwrap();
        assert_eq!(cli.mode(), Mode::Tokens);

        let cli = Cli::try_parse_from(["teeny", "--check", "a.teeny"]).unwrap();
        assert_eq!(cli.mode(), Mode::Check);

        assert!(Cli::try_parse_from(["teeny", "--tokens", "--check", "a.teeny"]).is_err());
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["teeny"]).is_err());
    }
}
