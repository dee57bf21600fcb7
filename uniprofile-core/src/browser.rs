// Launch the platform browser for a discovered profile

use std::io;
use std::process::{Command, Stdio};
use tracing::debug;
use url::Url;

/// Build the platform opener command. The URL is passed as a single argument and
/// never goes through a shell string.
pub fn opener_command(url: &str) -> Command {
    // Not `cmd /C start`: cmd.exe would treat `&`, `|` and `^` in a query as operators
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("rundll32");
        cmd.args(["url.dll,FileProtocolHandler", url]);
        cmd
    }
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Open `url` in the default browser without waiting for it to exit.
pub fn open_in_browser(url: &str) -> io::Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}: {}", url, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to open non-web URL {}", url),
        ));
    }

    debug!("Opening {} in browser", parsed);
    opener_command(parsed.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
