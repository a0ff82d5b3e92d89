use crate::model::Notification;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Reads newline-delimited JSON notifications and forwards them to the queue.
/// Blank lines are skipped, undecodable lines are logged and skipped.
/// Returns the number of notifications forwarded once the input ends.
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<Notification>) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0u64;
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Notification>(line) {
            Ok(notification) => {
                tx.send(notification).await.context("rss queue closed")?;
                forwarded += 1;
            }
            Err(err) => warn!(?err, "skipping undecodable notification line"),
        }
    }
    info!(forwarded, "notification input ended");
    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwards_both_shapes_and_skips_noise() {
        let input = concat!(
            "[\"🆕 Title : Shoes\\nmore\", \"http://a\", \"t\", \"http://buy\", \"Buy\"]\n",
            "\n",
            "not json\n",
            "{\"content\": \"plain\", \"url\": \"http://b\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(8);
        let forwarded = forward_lines(input.as_bytes(), tx).await.unwrap();
        assert_eq!(forwarded, 2);
        assert_eq!(rx.recv().await.unwrap().url, "http://a");
        assert_eq!(rx.recv().await.unwrap().content, "plain");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn closed_queue_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let res = forward_lines("{\"content\": \"c\", \"url\": \"u\"}\n".as_bytes(), tx).await;
        assert!(res.is_err());
    }
}
