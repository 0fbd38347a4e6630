use clap::{arg, command};
use crate::CLAP_STYLING;
use sitegraph::config::DEFAULT_CONFIG_PATH;
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegraph")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Only log warnings and errors")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("serve")
                .about("Serve GET /crawl?url=<seed>&deep=<pages> over HTTP")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to the TOML configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-l --"listen" <ADDR>)
                        .required(false)
                        .help("Address to bind, overrides server.listen from the config"),
                ),
        )
        .subcommand(
            command!("crawl")
                .about("Crawl a site in-process and print its sitemap")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-d --"deep" <PAGES>)
                        .required(false)
                        .help("Stop after this many pages (0 = no limit)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to the TOML configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print a JSON report (pages, links, sitemap) instead of the tree")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"path-to" <URL>)
                        .required(false)
                        .help("Also print the shortest link path from the seed to this URL"),
                ),
        )
        .subcommand(
            command!("client")
                .about("Ask a running sitegraph server to crawl a site")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl"),
                )
                .arg(
                    arg!(-d --"deep" <PAGES>)
                        .required(false)
                        .help("Stop after this many pages (0 = no limit)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-e --"endpoint" <URL>)
                        .required(false)
                        .help("Base URL of the sitegraph server")
                        .value_parser(clap::value_parser!(Url))
                        .default_value("http://localhost:1234"),
                ),
        )
}
