//! Print the event stream of a document read from stdin.
//!
//! Run with: cargo run --example stdin_parse < catalog.xml

use std::io::Read;
use std::process::ExitCode;

use tagbind_core::{EventReader, Location};

fn main() -> ExitCode {
    let mut input = Vec::new();
    if let Err(err) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("read error: {}", err);
        return ExitCode::FAILURE;
    }

    let result = EventReader::new(&input).parse(|event| {
        eprintln!("EVENT: {:?}", event);
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.position() {
                Some(pos) => {
                    let loc = Location::of(&input, pos);
                    eprintln!("error at {}:{}: {}", loc.line, loc.column, err);
                }
                None => eprintln!("error: {}", err),
            }
            ExitCode::FAILURE
        }
    }
}
