mod cli;
mod shell;

use std::io::{self, BufRead, Write};

use clap::Parser;

use self::{
    cli::{Cli, Line},
    shell::{Flow, Shell},
};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut shell = Shell::default();
    if let Some(image) = &cli.image {
        if let Err(e) = shell.open(image) {
            eprintln!("{}: {e}", image.display());
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // `help` ends up here too
                e.print()?;
                continue;
            }
        };
        match shell.execute(command, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(e) => eprintln!("{e}"),
        }
    }

    if let Err(e) = shell.close() {
        eprintln!("{e}");
    }
    Ok(())
}
