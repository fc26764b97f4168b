//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden; actor logs carry an `entity_type`
//! field instead.
//!
//! ```bash
//! RUST_LOG=info cargo run     # accepted transitions, creations, lock claims
//! RUST_LOG=debug cargo run    # request payloads and every ledger change
//! ```
//!
//! A picking pass at `info` reads roughly:
//!
//! ```text
//! INFO Created entity_type="Order" id=order_1 size=1
//! INFO Action ok entity_type="Order" id=order_1
//! INFO Transition applied order_id=order_1 transition=ConfirmPick status=armado actor=Lucho
//! ```
//!
//! and a rejected one:
//!
//! ```text
//! WARN Transition rejected order_id=order_1 transition=ConfirmPick actor=Franco error=Order is being worked on by Lucho
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
