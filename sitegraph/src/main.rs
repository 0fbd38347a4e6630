use commands::command_argument_builder;
use sitegraph::handlers::{handle_client, handle_crawl, handle_serve, init_logging};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    let result = match chosen_command.subcommand() {
        Some(("serve", primary_command)) => {
            init_logging(if quiet { "warn" } else { "info" });
            handle_serve(primary_command).await
        }
        Some(("crawl", primary_command)) => {
            // keep the spinner readable unless RUST_LOG asks for more
            init_logging("warn");
            handle_crawl(primary_command).await
        }
        Some(("client", primary_command)) => {
            init_logging("warn");
            handle_client(primary_command).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
