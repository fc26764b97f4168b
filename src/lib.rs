//! # Fulfillment Orders
//!
//! Tracks customer orders through picking, control, invoicing, transit,
//! delivery and payment, with two kinds of staff working the same orders:
//! coordinators (create orders, edit budgets and invoices, verify transfers)
//! and fulfillment staff (pick, control, ship, deliver, collect).
//!
//! ## Module tour
//!
//! ### 1. The workflow ([`workflow`])
//! Pure, synchronous and clock-free. The transition table, the guards, the
//! work lock, the ledger reconciler and the single write path
//! [`Order::apply_transition`](model::Order::apply_transition).
//!
//! ### 2. The data ([`model`])
//! [`Order`](model::Order) and its line items, the missing and returned
//! ledgers, the history log, actors and notifications.
//!
//! ### 3. The actors ([`order_actor`], [`staff_actor`])
//! Each resource type lives in one
//! [`ResourceActor`](actor_framework::ResourceActor) task, which serializes
//! every request for that type. This is what keeps two transitions on the same
//! order from interleaving.
//!
//! ### 4. The interface ([`clients`])
//! [`OrderClient`](clients::OrderClient) and
//! [`StaffClient`](clients::StaffClient) hide the message passing and hand back
//! typed errors.
//!
//! ### 5. The orchestrator ([`lifecycle`])
//! [`OrderSystem`](lifecycle::OrderSystem) wires the actors, owns the
//! notification channel and shuts everything down. Configuration and tracing
//! setup live here too.
//!
//! ## Running the demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod clients;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod staff_actor;
pub mod workflow;
