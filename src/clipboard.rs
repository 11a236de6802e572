use std::{
    io::Write,
    process::{Command, Stdio},
};

use crate::error::{Error, Result};

/// Something that can place text on the clipboard.
pub trait ClipboardProvider {
    fn write(&self, text: &str) -> Result<()>;
}

impl<F> ClipboardProvider for F
where
    F: Fn(&str) -> Result<()>,
{
    fn write(&self, text: &str) -> Result<()> {
        self(text)
    }
}

/// Copies through the platform clipboard tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

struct ClipboardCommand {
    bin: &'static str,
    args: &'static [&'static str],
}

fn candidate_commands() -> &'static [ClipboardCommand] {
    if cfg!(target_os = "macos") {
        &[ClipboardCommand {
            bin: "pbcopy",
            args: &[],
        }]
    } else if cfg!(windows) {
        &[ClipboardCommand {
            bin: "clip",
            args: &[],
        }]
    } else {
        &[
            ClipboardCommand {
                bin: "wl-copy",
                args: &[],
            },
            ClipboardCommand {
                bin: "xclip",
                args: &["-selection", "clipboard"],
            },
            ClipboardCommand {
                bin: "xsel",
                args: &["-b"],
            },
        ]
    }
}

impl ClipboardProvider for SystemClipboard {
    /// Try each known tool in turn; the first that exits cleanly wins.
    fn write(&self, text: &str) -> Result<()> {
        let mut failures = Vec::new();

        for cmd in candidate_commands() {
            match pipe_to(cmd, text) {
                Ok(()) => {
                    tracing::debug!(tool = cmd.bin, "copied prompt to clipboard");
                    return Ok(());
                }
                Err(e) => failures.push(format!("{}: {e}", cmd.bin)),
            }
        }

        Err(Error::Clipboard(failures.join("; ")))
    }
}

fn pipe_to(cmd: &ClipboardCommand, text: &str) -> std::io::Result<()> {
    let mut child = Command::new(cmd.bin)
        .args(cmd.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));

    // Closing stdin (dropped above) lets the tool exit before we wait.
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("exited with {status}")))
    }
}
