use colored::*;
use gleaner::commands::command_argument_builder;
use gleaner::handlers::{handle_crawl, handle_file, handle_list, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");
    init_logging(chosen_command.get_count("verbose"), quiet);

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("file", primary_command)) => handle_file(primary_command, quiet).await,
        Some(("list", primary_command)) => handle_list(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
