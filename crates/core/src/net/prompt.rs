//! Interactive confirmation seam.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Asks the operator a yes/no question.
///
/// Trait seam so the confirm tier can be exercised in tests without a
/// terminal.
#[async_trait]
pub trait Prompter: Send + Sync + 'static {
    /// Returns true when the operator answered yes.
    async fn confirm(&self, question: &str) -> bool;
}

/// Prompter backed by the process stdin/stdout.
///
/// Concurrent log lines may interleave with the question text; the answer
/// read is unaffected, a plain `y` + enter is enough.
#[derive(Debug, Default)]
pub struct StdinPrompter;

#[async_trait]
impl Prompter for StdinPrompter {
    async fn confirm(&self, question: &str) -> bool {
        let mut stdout = tokio::io::stdout();
        if stdout.write_all(question.as_bytes()).await.is_err() {
            return false;
        }
        let _ = stdout.flush().await;

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(_) => line.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}
