//! Message display published over Zenoh

use zenoh::key_expr::KeyExpr;

use super::keyexpr::display_keyexpr;
use crate::error::Result;
use crate::ports::MessageDisplay;

/// Publishes every text set on the display to `<prefix>/display`
///
/// Texts are queued and published in order by a background task.
#[derive(Debug)]
pub struct ZenohDisplay {
    texts: flume::Sender<String>,
    task: tokio::task::JoinHandle<()>,
}

impl ZenohDisplay {
    pub async fn new(session: &zenoh::Session, prefix: &KeyExpr<'_>) -> Result<Self> {
        let publisher = session.declare_publisher(display_keyexpr(prefix)?).await?;
        let (texts, texts_rx) = flume::unbounded::<String>();

        let task = tokio::spawn(async move {
            while let Ok(text) = texts_rx.recv_async().await {
                if let Err(e) = publisher.put(zenoh_ext::z_serialize(&text)).await {
                    tracing::warn!("Failed to publish display text: {}", e);
                }
            }
        });

        Ok(Self { texts, task })
    }
}

impl MessageDisplay for ZenohDisplay {
    fn set_text(&mut self, text: &str) {
        if self.texts.send(text.to_string()).is_err() {
            tracing::warn!("Display publisher task is gone, text dropped");
        }
    }
}

impl Drop for ZenohDisplay {
    fn drop(&mut self) {
        self.task.abort();
    }
}
