pub mod browser;
pub mod report;
pub mod scan;

use colored::Colorize;

const BANNER: &str = r#"
    ╔══════════════════════════════════════════════════════════════╗
    ║  ██╗   ██╗███╗   ██╗██╗██████╗ ██████╗  ██████╗ ███████╗     ║
    ║  ██║   ██║████╗  ██║██║██╔══██╗██╔══██╗██╔═══██╗██╔════╝     ║
    ║  ██║   ██║██╔██╗ ██║██║██████╔╝██████╔╝██║   ██║█████╗       ║
    ║  ██║   ██║██║╚██╗██║██║██╔═══╝ ██╔══██╗██║   ██║██╔══╝       ║
    ║  ╚██████╔╝██║ ╚████║██║██║     ██║  ██║╚██████╔╝██║          ║
    ║   ╚═════╝ ╚═╝  ╚═══╝╚═╝╚═╝     ╚═╝  ╚═╝ ╚═════╝ ╚═╝          ║
    ║                                                              ║
    ║            Find a username across popular sites              ║
    ╚══════════════════════════════════════════════════════════════╝
"#;

pub fn print_banner() {
    println!("{}", BANNER.cyan().bold());
    println!(
        "    {} {}\n",
        "version".bright_black(),
        env!("CARGO_PKG_VERSION").bright_white()
    );
}
