use clap::Parser;

use kakeibo_calc::api::{Cli, render_error, run};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let json = cli.json;
    match run(cli) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            if json {
                println!("{}", render_error(&err, json));
            } else {
                eprintln!("{}", render_error(&err, json));
            }
            std::process::exit(if err.is_validation() { 2 } else { 1 });
        }
    }
}
