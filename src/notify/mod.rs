// src/notify/mod.rs
pub mod email;

pub use email::EmailSender;

use anyhow::Result;

use crate::sources::types::CanonicalPosting;

/// Outbound notification seam. The pipeline hands a non-empty finalized
/// result set over and moves on; composing and transmitting the message is
/// the implementation's business.
#[async_trait::async_trait]
pub trait PostingNotifier: Send + Sync {
    async fn notify(&self, postings: &[CanonicalPosting]) -> Result<()>;
}
