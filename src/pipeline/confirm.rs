//! Write confirmation

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Decides whether the planned output files may be written.
pub trait Confirm: Send + Sync {
    fn confirm_writes(&self, paths: &[PathBuf]) -> std::io::Result<bool>;
}

/// Only `y` / `yes` (any case, surrounding whitespace ignored) is a yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Lists the paths on a writer and reads the answer from a reader.
pub struct InteractiveConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> InteractiveConfirm<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { io: Mutex::new((reader, writer)) }
    }
}

impl InteractiveConfirm<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> Confirm for InteractiveConfirm<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm_writes(&self, paths: &[PathBuf]) -> std::io::Result<bool> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| std::io::Error::other("confirmation prompt poisoned"))?;
        let (reader, writer) = &mut *guard;

        writeln!(writer, "\nFiles to be written:")?;
        for path in paths {
            writeln!(writer, "  - {}", path.display())?;
        }
        write!(writer, "\nProceed with writing these files? (y/N): ")?;
        writer.flush()?;

        let mut answer = String::new();
        // EOF leaves the answer empty, which is a no.
        reader.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Approves without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm_writes(&self, _paths: &[PathBuf]) -> std::io::Result<bool> {
        Ok(true)
    }
}
