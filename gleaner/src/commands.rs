use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("gleaner")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("gleaner")
        .about("Scrape pages for embedded hosts, script URLs and cloud-hosted assets")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Only log errors and hide the progress spinner")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(scan_arguments(
            command!("crawl")
                .about(
                    "Download a site and scrape it for hosts, IPs and URLs, following script \
                URLs up to the configured depth. Cloud-hosted hostnames are printed to stdout.",
                )
                .arg(
                    arg!(<TARGET>)
                        .required(true)
                        .help("The site to scrape (http:// is assumed when no scheme is given)"),
                ),
        ))
        .subcommand(scan_arguments(
            command!("file")
                .about("Scrape a page dump already on disk")
                .arg(
                    arg!(<PATH>)
                        .required(true)
                        .help("Path of the local page dump"),
                )
                .arg(
                    arg!(-H --"hostname" <HOST>)
                        .required(false)
                        .help("Hostname the dump was taken from, used to recognise same-site scripts"),
                ),
        ))
        .subcommand(
            command!("list")
                .about("Scrape every site listed in a file (not implemented yet)")
                .arg(
                    arg!(<PATH>)
                        .required(true)
                        .help("A line delimited list of sites"),
                ),
        )
}

fn scan_arguments(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-d --"max-depth" <LEVELS>)
            .required(false)
            .help("How many hops of followed script URLs to fetch")
            .value_parser(clap::value_parser!(usize))
            .default_value("1"),
    )
    .arg(
        arg!(--"depth-mode" <MODE>)
            .required(false)
            .help("per-url: every followed URL costs a level; per-level: a page's URLs share one")
            .value_parser(["per-url", "per-level"])
            .default_value("per-url"),
    )
    .arg(
        arg!(--"chunk-size" <BYTES>)
            .required(false)
            .help("Size of the chunks a page is scanned in")
            .value_parser(clap::value_parser!(usize))
            .default_value("1024"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
    .arg(
        arg!(--"dump-dir" <PATH>)
            .required(false)
            .help("Directory downloaded pages are written to (default: <tmp>/gleaner)"),
    )
    .arg(
        arg!(--"tld-file" <PATH>)
            .required(false)
            .help("TLD whitelist, one per line (IANA tlds-alpha-by-domain.txt layout)"),
    )
    .arg(
        arg!(--"cdn-marker" <MARKER>)
            .required(false)
            .help("Hostname fragment identifying a CDN whose scripts are followed (repeatable)")
            .action(clap::ArgAction::Append),
    )
    .arg(
        arg!(--"cloud-marker" <MARKER>)
            .required(false)
            .help("URL fragment identifying cloud-hosted assets (repeatable)")
            .action(clap::ArgAction::Append),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save a report to file")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
}
