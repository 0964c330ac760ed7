//! Cart inspection and mutation commands.

use kirana_client::Session;
use kirana_core::{ProductId, format_inr};
use tracing::info;

/// Print cart lines and derived totals.
#[allow(clippy::print_stdout)]
pub fn show(session: &Session) {
    let lines = session.cart.lines();
    if lines.is_empty() {
        println!("cart is empty");
        return;
    }
    for line in &lines {
        println!(
            "{:<12} {:<32} {:>3} x {:>8} = {:>10}",
            line.product_id,
            line.name,
            line.quantity,
            format_inr(line.unit_price),
            format_inr(line.line_total()),
        );
    }
    let totals = session.cart.totals();
    println!("subtotal     {:>10}", format_inr(totals.subtotal));
    println!("delivery fee {:>10}", format_inr(totals.delivery_fee));
    println!("tax          {:>10}", format_inr(totals.tax));
    println!("total        {:>10}", format_inr(totals.total));
}

/// Set a line's quantity; zero removes the line.
pub async fn set_quantity(session: &Session, product_id: &str, quantity: u32) {
    session
        .cart
        .set_quantity(&ProductId::new(product_id), quantity)
        .await;
    info!(product = product_id, quantity, "cart updated");
    show(session);
}

/// Remove every line from the cart.
pub async fn clear(session: &Session) {
    session.cart.clear().await;
    info!("cart cleared");
}
