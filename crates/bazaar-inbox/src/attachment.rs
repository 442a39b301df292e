//! Image attachments: turning a picked file into an inline `data:` URL off
//! the UI thread.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bazaar_shared::{ConversationId, Role, Username};
use tokio::task::JoinHandle;

use crate::error::{InboxError, Result};

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Where an encoded image should land, captured when the send started.
///
/// `conversation` is `None` when no thread existed yet; completion then
/// creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub role: Role,
    pub counterparty: Username,
    pub conversation: Option<ConversationId>,
}

/// An encode in flight.  Await [`PendingImage::wait`] and hand the result to
/// [`Inbox::finish_image`](crate::Inbox::finish_image).
#[derive(Debug)]
pub struct PendingImage {
    target: ImageTarget,
    file_name: String,
    task: JoinHandle<Result<String>>,
}

/// Outcome of an encode, ready to be applied.
#[derive(Debug)]
pub struct EncodedImage {
    pub target: ImageTarget,
    pub file_name: String,
    pub result: Result<String>,
}

impl PendingImage {
    pub(crate) fn spawn(target: ImageTarget, file: ImageFile) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| InboxError::NoRuntime)?;
        let ImageFile { name, bytes } = file;
        let task = handle.spawn_blocking(move || encode_data_url(&bytes));
        Ok(Self {
            target,
            file_name: name,
            task,
        })
    }

    pub fn target(&self) -> &ImageTarget {
        &self.target
    }

    pub async fn wait(self) -> EncodedImage {
        let result = match self.task.await {
            Ok(result) => result,
            Err(e) => Err(InboxError::ImageEncoding(format!("encoder task failed: {e}"))),
        };
        EncodedImage {
            target: self.target,
            file_name: self.file_name,
            result,
        }
    }
}

/// Encode raw image bytes as a `data:<mime>;base64,...` URL.  The format is
/// sniffed from the content, not the file name.
pub fn encode_data_url(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(InboxError::ImageEncoding("file is empty".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|e| InboxError::ImageEncoding(format!("unrecognised image: {e}")))?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}
