use uniprofile::commands::command_argument_builder;
use uniprofile::handlers::{ScanSettings, handle_scan, handle_sites, init_tracing};
use uniprofile_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("scan", primary_command)) => {
            let mut settings = ScanSettings::from_matches(primary_command);
            settings.quiet = quiet;
            handle_scan(settings).await
        }
        Some(("sites", primary_command)) => handle_sites(primary_command),
        None => {
            // No subcommand: prompt for a username and scan with defaults
            let settings = ScanSettings {
                quiet,
                ..ScanSettings::default()
            };
            handle_scan(settings).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
