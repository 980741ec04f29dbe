//! Async API for non-blocking text cleaning.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! promptsafe = { version = "0.1", features = ["async"] }
//! ```

use crate::diagnostics::DebugTrace;
use crate::error::{Error, Result};
use crate::options::CleanOptions;
use crate::CleanReport;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(err: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(err.to_string()))
}

/// Asynchronously cleans text.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> promptsafe::Result<()> {
/// use promptsafe::CleanOptions;
///
/// let cleaned = promptsafe::async_api::clean("<p>Some page text</p>", &CleanOptions::default()).await?;
/// println!("{}", cleaned);
/// # Ok(())
/// # }
/// ```
pub async fn clean(text: &str, options: &CleanOptions) -> Result<String> {
    Ok(clean_with_report(text, options).await?.text)
}

/// Asynchronously cleans text and reports the outcome.
pub async fn clean_with_report(text: &str, options: &CleanOptions) -> Result<CleanReport> {
    // The pipeline is CPU-bound, so it runs on the blocking pool
    let text = text.to_string();
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::clean_with_report(&text, &options))
        .await
        .map_err(join_error)
}

/// Asynchronously reads and cleans a UTF-8 text file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> promptsafe::Result<()> {
/// use promptsafe::CleanOptions;
///
/// let cleaned = promptsafe::async_api::clean_file("page.txt", &CleanOptions::default()).await?;
/// tokio::fs::write("page.clean.txt", cleaned).await?;
/// # Ok(())
/// # }
/// ```
pub async fn clean_file(path: impl AsRef<Path>, options: &CleanOptions) -> Result<String> {
    let text = fs::read_to_string(path).await?;
    clean(&text, options).await
}

/// Asynchronously reads text from an async reader and cleans it.
pub async fn clean_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    options: &CleanOptions,
) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    clean(&text, options).await
}

/// Asynchronously cleans many texts on the blocking pool.
pub async fn clean_batch(texts: Vec<String>, options: &CleanOptions) -> Result<Vec<String>> {
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::clean_batch(&texts, &options))
        .await
        .map_err(join_error)
}

/// Asynchronously traces each stage for one input.
pub async fn debug_steps(text: &str, options: &CleanOptions) -> Result<DebugTrace> {
    let text = text.to_string();
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::debug_steps_with(&text, &options))
        .await
        .map_err(join_error)
}
