//! Mython interpreter command-line.
//!
//! When called with file arguments, it interprets the corresponding files in
//! a single interpreter session (so code and data sharing is possible).
//!
//! When called without arguments, it reads a whole program from standard
//! input and interprets it.

use std::env;
use std::fs::File;
use std::io;
use std::io::BufReader;

use anyhow::Context;

use mython::interpreter::Interpreter;

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();

    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    if args.is_empty() {
        let stdin = io::stdin();
        interp.eval(stdin.lock())?;
    } else {
        for p in &args {
            let reader =
                BufReader::new(File::open(p).with_context(|| format!("failed to open {}", p))?);
            interp.eval(reader)?;
        }
    }

    Ok(())
}
