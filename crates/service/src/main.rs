//! Demo binary: seeds a catalog and walks one order through reservation,
//! partial fulfilment, and a full return, printing the views as JSON.

use stockyard_core::Money;
use stockyard_orders::{ClientInfo, ReturnRequestLine};
use stockyard_service::{OrderLineRequest, Stockyard};

fn main() {
    stockyard_observability::init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let yard = Stockyard::new();

    let warehouse = yard.create_warehouse("Main hub", Some("12 Dock Rd".to_string()))?;
    let product = yard.create_product(
        "Widget",
        "general",
        Some("A demo widget".to_string()),
        Money::from_minor(1250),
    )?;
    let (p, w) = (product.id_typed(), warehouse.id_typed());

    yard.receive_stock(p, w, 5)?;

    let order = yard.create_order(
        w,
        ClientInfo {
            client_name: "A. Client".to_string(),
            destination_address: "1 Main St".to_string(),
            comment: None,
        },
        &[OrderLineRequest {
            product_id: p,
            quantity: 3,
        }],
    )?;
    println!("{}", serde_json::to_string_pretty(&order)?);
    println!("stock after order: {}", yard.stock_level(p, w)?.quantity);

    let ret = yard.create_return(
        order.id,
        Some("changed mind".to_string()),
        &[ReturnRequestLine {
            product_id: p,
            quantity: 3,
        }],
    )?;
    println!("{}", serde_json::to_string_pretty(&ret)?);
    println!("stock after return: {}", yard.stock_level(p, w)?.quantity);
    println!(
        "final order status: {}",
        yard.get_order(order.id)?.status
    );

    Ok(())
}
