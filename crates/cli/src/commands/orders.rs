//! Order inspection and cancellation commands.

use kirana_client::Session;
use kirana_core::{OrderId, format_inr};
use tracing::info;

/// Fetch the authoritative order list and print it, newest first.
#[allow(clippy::print_stdout)]
pub async fn list(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    session.orders.load().await?;

    let orders = session.orders.orders();
    if orders.is_empty() {
        println!("no orders");
        return Ok(());
    }
    for order in &orders {
        println!(
            "{:<10} {:<20} {:<18} {:>10}  {}",
            order.order_id,
            order.order_number,
            order.order_status.label(),
            format_inr(order.total_amount),
            order.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

/// Cancel an order with a reason.
pub async fn cancel(
    session: &Session,
    order_id: &str,
    reason: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let order_id = OrderId::new(order_id);
    session.orders.cancel(&order_id, reason).await?;
    info!(order = %order_id, "order cancelled");
    Ok(())
}
