use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an order sits in the fulfillment pipeline.
///
/// Variants are declared in pipeline order; `Ord` follows that order, so
/// `a < b` means `a` comes earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Budget stage; items are being picked.
    EnArmado,
    /// Picked, waiting for a second actor to control the pick.
    Armado,
    /// Pick controlled; the coordinator may edit the invoice.
    ArmadoControlado,
    Facturado,
    FacturaControlada,
    EnTransito,
    Entregado,
    /// Terminal.
    Pagado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::EnArmado,
        OrderStatus::Armado,
        OrderStatus::ArmadoControlado,
        OrderStatus::Facturado,
        OrderStatus::FacturaControlada,
        OrderStatus::EnTransito,
        OrderStatus::Entregado,
        OrderStatus::Pagado,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::EnArmado => "en_armado",
            OrderStatus::Armado => "armado",
            OrderStatus::ArmadoControlado => "armado_controlado",
            OrderStatus::Facturado => "facturado",
            OrderStatus::FacturaControlada => "factura_controlada",
            OrderStatus::EnTransito => "en_transito",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Pagado => "pagado",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::EnArmado => "Picking",
            OrderStatus::Armado => "Picked",
            OrderStatus::ArmadoControlado => "Pick controlled",
            OrderStatus::Facturado => "Invoiced",
            OrderStatus::FacturaControlada => "Invoice controlled",
            OrderStatus::EnTransito => "In transit",
            OrderStatus::Entregado => "Delivered",
            OrderStatus::Pagado => "Paid",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Pagado
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}
