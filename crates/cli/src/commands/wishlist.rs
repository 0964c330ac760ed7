//! Wishlist inspection and sync commands.

use kirana_client::Session;
use kirana_core::{ProductId, format_inr};
use tracing::info;

/// Print locally-known wishlist entries.
#[allow(clippy::print_stdout)]
pub fn show(session: &Session) {
    let entries = session.wishlist.entries();
    if entries.is_empty() {
        println!("wishlist is empty");
        return;
    }
    for entry in &entries {
        println!(
            "{:<12} {:<32} {:>8}  added {}",
            entry.product_id,
            entry.product.name,
            format_inr(entry.product.unit_price),
            entry.added_at.format("%Y-%m-%d"),
        );
    }
}

/// Pull the authoritative remote list, then print it.
pub async fn sync(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    session.wishlist.sync().await?;
    info!("wishlist synced");
    show(session);
    Ok(())
}

/// Remove a product from the wishlist (local truth wins).
pub async fn remove(session: &Session, product_id: &str) {
    session.wishlist.remove(&ProductId::new(product_id)).await;
    info!(product = product_id, "wishlist entry removed");
}
