use clap_markdown::help_markdown;
use litefs::cli::Cli;

fn main() {
    println!("# litefs CLI Reference");
    println!();
    println!("This page contains the auto-generated reference documentation for the `litefs` command-line interface.");
    println!();

    println!("{}", help_markdown::<Cli>());
}
