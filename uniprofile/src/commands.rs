use crate::CLAP_STYLING;
use clap::{Arg, arg, command};

fn sites_file_arg() -> Arg {
    arg!(--"sites" <PATH>)
        .required(false)
        .help("JSON file with a custom list of sites to check instead of the built-in list")
        .value_parser(clap::value_parser!(std::path::PathBuf))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("uniprofile")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("uniprofile")
        .about("Find a username across popular sites")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about("Check every site for a username. Prompts for one when omitted.")
                .arg(
                    arg!([USERNAME])
                        .required(false)
                        .help("The username to look for (A-Z, a-z, 0-9, -, _, .)"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Maximum number of sites probed at the same time")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds, per attempt")
                        .value_parser(clap::value_parser!(u64).range(1..=60))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"delay" <MILLISECONDS>)
                        .required(false)
                        .help("Pause between starting two probes")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("100"),
                )
                .arg(sites_file_arg())
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save results to file (default: results.txt on 'save')")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Saved results format: text, json, csv")
                        .value_parser(["text", "json", "csv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"no-interactive")
                        .required(false)
                        .help("Print results and exit without the open/save prompt")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("sites")
                .about("List the sites that are checked, in result order")
                .arg(sites_file_arg()),
        )
}
