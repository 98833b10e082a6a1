//! Link adapter trait

use async_trait::async_trait;

use super::LinkError;

/// Byte-level interface to the upstream ECU
///
/// The adapter is owned exclusively by one acquisition loop, so every
/// operation takes `&mut self`.
#[async_trait]
pub trait LinkAdapter: Send {
    /// Write request bytes to the ECU
    async fn send(&mut self, request: &[u8]) -> Result<(), LinkError>;

    /// Read whatever bytes are available into `buf`
    ///
    /// Waits until at least one byte arrives. Returns `Ok(0)` when the link
    /// has nothing more to deliver (end of stream). Callers bound the wait
    /// with their own timeout.
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// Human-readable description for logs (port path, "mock", ...)
    fn describe(&self) -> String;
}

#[async_trait]
impl<L: LinkAdapter + ?Sized> LinkAdapter for Box<L> {
    async fn send(&mut self, request: &[u8]) -> Result<(), LinkError> {
        (**self).send(request).await
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        (**self).receive(buf).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
