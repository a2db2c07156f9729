//! Order-locator artifact seam.
//!
//! Each order carries a scannable-code artifact encoding a dereferenceable
//! locator. Rendering and storing the actual image is an external concern;
//! this module only fixes the locator format and the encoder boundary.

use stockyard_core::DomainResult;
use stockyard_orders::OrderId;

/// The dereferenceable locator embedded in an order's scannable code.
pub fn order_locator(order_id: OrderId) -> String {
    format!("/api/orders/order/{order_id}")
}

/// Boundary to whatever produces the scannable-code artifact.
///
/// `encode` returns an opaque reference to the persisted artifact. A failure
/// here aborts order creation entirely; the workflow calls the encoder before
/// its first visible write.
pub trait ArtifactEncoder: Send + Sync {
    fn encode(&self, locator: &str) -> DomainResult<String>;
}

/// Default encoder: derives a stable opaque reference from the locator
/// without producing an image. Deployments plug a real QR/file-storage
/// collaborator in through [`ArtifactEncoder`].
#[derive(Debug, Default)]
pub struct InlineArtifactEncoder;

impl ArtifactEncoder for InlineArtifactEncoder {
    fn encode(&self, locator: &str) -> DomainResult<String> {
        Ok(format!("qr:{locator}"))
    }
}
