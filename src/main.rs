//! Walks one order from budget to payment against an in-process
//! [`OrderSystem`], logging each step.

use fulfillment_orders::lifecycle::{setup_tracing, OrderSystem, SystemConfig};
use fulfillment_orders::model::{Actor, OrderCreate, ProductDraft, StaffId};
use fulfillment_orders::workflow::{Transition, TransitionRequest};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = SystemConfig::from_env()?;
    let system = OrderSystem::with_default_staff(config).await?;

    let vale = system.staff_client.identify(StaffId(1)).await?;
    let lucho = system.staff_client.identify(StaffId(2)).await?;
    let franco = system.staff_client.identify(StaffId(3)).await?;

    let mut lucho_feed = system.feed_for(&lucho);
    let orders = system.order_client.clone();

    let create = OrderCreate::new("Almacen Sur", vale.clone())
        .address("Av. Mitre 1450")
        .notes("Deliver before noon")
        .product(ProductDraft::new("Yerba 1kg", 10.0).with_code("YB-1"))
        .product(ProductDraft::new("Azucar 1kg", 6.0).with_code("AZ-1"));
    let id = orders.create_order(create).await?;
    info!(order_id = %id, "Order created");

    let span = tracing::info_span!("picking", order_id = %id);
    async {
        orders.acquire_lock(id, &lucho).await?;

        // Franco tries to start on the same order.
        if let Err(e) = orders.acquire_lock(id, &franco).await {
            warn!(error = %e, "Second picker turned away");
        }

        let order = orders.get_order(id).await?;
        let mut working = order.working_copy();
        working[0].quantity = 8.0;
        working.iter_mut().for_each(|p| p.checked = true);

        let picked = orders
            .apply_transition(
                id,
                TransitionRequest::new(Transition::ConfirmPick, lucho.clone()).with_items(working),
            )
            .await?;
        info!(missing = %picked.missing_summary(), "Picking done");
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("control", order_id = %id);
    async {
        let actions = orders.next_actions(id, &franco, None).await?;
        for action in &actions {
            info!(label = action.label, invokable = action.is_invokable(), "Offered");
        }
        run_pass(&orders, id, Transition::ConfirmPickControl, &franco).await?;

        // The supplier sent the two missing units after all.
        let order = orders.get_order(id).await?;
        let mut invoice = order.working_copy();
        invoice[0].quantity = 10.0;
        orders
            .apply_transition(
                id,
                TransitionRequest::new(Transition::EditInvoice, vale.clone()).with_items(invoice),
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("invoicing_and_delivery", order_id = %id);
    let delivered = async {
        orders
            .apply_transition(id, TransitionRequest::new(Transition::Invoice, vale.clone()))
            .await?;
        run_pass(&orders, id, Transition::ConfirmInvoiceControl, &franco).await?;
        orders
            .apply_transition(id, TransitionRequest::new(Transition::Dispatch, lucho.clone()))
            .await?;

        let order = orders.get_order(id).await?;
        let mut working = order.working_copy();
        working[1].quantity = 5.0;
        working.iter_mut().for_each(|p| p.checked = true);
        let delivered = orders
            .apply_transition(
                id,
                TransitionRequest::new(Transition::ConfirmDelivery, lucho.clone())
                    .with_items(working)
                    .with_note("One bag was torn"),
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(delivered)
    }
    .instrument(span)
    .await?;
    info!(returned = delivered.returned_products().len(), "Delivered");

    orders
        .apply_transition(id, TransitionRequest::new(Transition::ReportTransfer, lucho.clone()))
        .await?;
    let paid = orders
        .apply_transition(id, TransitionRequest::new(Transition::VerifyTransfer, vale))
        .await?;
    info!(status = %paid.status(), paid = paid.is_paid(), "Payment settled");

    for entry in paid.history() {
        info!(user = %entry.user, note = ?entry.note, "{}", entry.action);
    }
    println!("{}", paid.invoice_summary());

    while let Some(event) = lucho_feed.try_recv() {
        info!(order_id = %event.order_id, by = %event.actor_name, status = %event.new_status, "Lucho was notified");
    }

    drop(orders);
    system.shutdown().await?;
    Ok(())
}

/// Ticks every item as counted unchanged and fires `transition`.
async fn run_pass(
    orders: &fulfillment_orders::clients::OrderClient,
    id: fulfillment_orders::model::OrderId,
    transition: Transition,
    actor: &Actor,
) -> Result<(), Box<dyn std::error::Error>> {
    orders.acquire_lock(id, actor).await?;
    let mut working = orders.get_order(id).await?.working_copy();
    working.iter_mut().for_each(|p| p.checked = true);
    orders
        .apply_transition(
            id,
            TransitionRequest::new(transition, actor.clone()).with_items(working),
        )
        .await?;
    Ok(())
}
