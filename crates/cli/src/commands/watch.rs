//! Stream push notifications to the log until interrupted.

use kirana_core::EventKind;
use tracing::info;

use kirana_client::Session;

/// Connect the push channel and log every notification until Ctrl-C.
///
/// Order events also trigger the session's own refetch wiring, so the
/// order list printed on exit reflects what the backend pushed.
pub async fn run(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    session.connect_push().await?;

    let _created = session.channel().subscribe(EventKind::OrderCreated, |event| {
        info!(?event, "order created");
    });
    let _updated = session
        .channel()
        .subscribe(EventKind::OrderStatusUpdated, |event| {
            info!(?event, "order status updated");
        });

    info!("watching for push notifications; Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    session.logout().await;
    Ok(())
}
