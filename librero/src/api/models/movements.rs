use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::movements::MovementDBResponse;
use crate::types::{InventoryId, MovementId, UserId};

/// The typed reason of a ledger entry. The wire literals are the domain
/// vocabulary the stores already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Inflow: goods received.
    Entrada,
    /// Outflow: goods shipped out.
    Salida,
    /// Outflow: a sale.
    Venta,
    /// Inflow: corrective adjustment.
    Ajuste,
}

/// Whether a movement kind increases or decreases stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl MovementKind {
    pub fn direction(self) -> Direction {
        match self {
            MovementKind::Entrada | MovementKind::Ajuste => Direction::Inflow,
            MovementKind::Salida | MovementKind::Venta => Direction::Outflow,
        }
    }

    /// The signed stock delta this kind produces for a (positive) quantity.
    pub fn signed_delta(self, quantity: i32) -> i32 {
        match self.direction() {
            Direction::Inflow => quantity,
            Direction::Outflow => -quantity,
        }
    }
}

/// Request body for recording a movement.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MovementCreate {
    pub inventory_id: InventoryId,
    pub kind: MovementKind,
    /// Units moved; must be a positive integer.
    pub quantity: i32,
    /// Acting user, if known.
    pub user_id: Option<UserId>,
    /// Override for the movement timestamp; defaults to the time of recording.
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovementResponse {
    pub id: MovementId,
    pub inventory_id: InventoryId,
    pub kind: MovementKind,
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl From<MovementDBResponse> for MovementResponse {
    fn from(m: MovementDBResponse) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            kind: m.kind,
            quantity: m.quantity,
            user_id: m.user_id,
            notes: m.notes,
            occurred_at: m.occurred_at,
        }
    }
}

/// Filter for listing movements.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListMovementsQuery {
    /// Restrict the listing to one movement kind.
    pub kind: Option<MovementKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_classify_into_inflow_and_outflow() {
        assert_eq!(MovementKind::Entrada.direction(), Direction::Inflow);
        assert_eq!(MovementKind::Ajuste.direction(), Direction::Inflow);
        assert_eq!(MovementKind::Salida.direction(), Direction::Outflow);
        assert_eq!(MovementKind::Venta.direction(), Direction::Outflow);
    }

    #[test]
    fn signed_delta_follows_direction() {
        assert_eq!(MovementKind::Entrada.signed_delta(7), 7);
        assert_eq!(MovementKind::Ajuste.signed_delta(1), 1);
        assert_eq!(MovementKind::Salida.signed_delta(7), -7);
        assert_eq!(MovementKind::Venta.signed_delta(3), -3);
    }

    #[test]
    fn kind_wire_literals_round_trip() {
        for (kind, literal) in [
            (MovementKind::Entrada, "\"entrada\""),
            (MovementKind::Salida, "\"salida\""),
            (MovementKind::Venta, "\"venta\""),
            (MovementKind::Ajuste, "\"ajuste\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), literal);
            let parsed: MovementKind = serde_json::from_str(literal).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_kind_literal_is_rejected() {
        assert!(serde_json::from_str::<MovementKind>("\"devolucion\"").is_err());
        assert!(serde_json::from_str::<MovementKind>("\"ENTRADA\"").is_err());
    }
}
