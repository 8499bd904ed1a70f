//! Text-to-speech through whatever synthesizer is installed.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use warden_core::SpeechBackend;

/// Programs tried in order. Each takes the text as its last argument.
const CANDIDATES: [&str; 3] = ["espeak-ng", "espeak", "say"];

#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: PathBuf,
}

impl CommandSpeech {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find the first known synthesizer on `PATH`.
    pub fn probe() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        Self::probe_in(std::env::split_paths(&path))
    }

    pub fn probe_in(dirs: impl IntoIterator<Item = PathBuf>) -> Option<Self> {
        let dirs: Vec<PathBuf> = dirs.into_iter().collect();
        CANDIDATES.iter().find_map(|name| {
            dirs.iter()
                .map(|dir| dir.join(name))
                .find(|candidate| candidate.is_file())
                .map(Self::new)
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SpeechBackend for CommandSpeech {
    fn speak(&mut self, text: &str) {
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(program = %self.program.display(), "Speech needs a tokio runtime");
            return;
        }

        let child = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.program.display(), error = %e, "Speech failed");
                return;
            }
        };

        // The synthesizer runs alongside the engine; reap it when it exits
        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::debug!(program = %program.display(), %status, "Speech exited with failure")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(program = %program.display(), error = %e, "Speech wait failed"),
            }
        });
    }
}
