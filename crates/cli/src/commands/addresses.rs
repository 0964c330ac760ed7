//! Saved-address listing command.

use kirana_client::RemoteGateway;

/// Fetch and print the user's saved addresses.
#[allow(clippy::print_stdout)]
pub async fn list(gateway: &dyn RemoteGateway) -> Result<(), Box<dyn std::error::Error>> {
    let addresses = gateway.fetch_addresses().await?;
    if addresses.is_empty() {
        println!("no saved addresses");
        return Ok(());
    }
    for address in &addresses {
        let default_marker = if address.is_default { " (default)" } else { "" };
        println!(
            "{}{} - {}, {} {} {}",
            address.name, default_marker, address.line1, address.city, address.state,
            address.pincode,
        );
    }
    Ok(())
}
