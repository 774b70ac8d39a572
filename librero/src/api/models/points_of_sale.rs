use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::points_of_sale::PosDBResponse;
use crate::types::PosId;

/// Kind of sales location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pos_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PosKind {
    Tienda,
    Metro,
    Online,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PosCreate {
    pub name: String,
    pub location: String,
    pub kind: PosKind,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PosUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<PosKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PosResponse {
    pub id: PosId,
    pub name: String,
    pub location: String,
    pub kind: PosKind,
}

impl From<PosDBResponse> for PosResponse {
    fn from(p: PosDBResponse) -> Self {
        Self {
            id: p.id,
            name: p.name,
            location: p.location,
            kind: p.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_kind_wire_literals_round_trip() {
        for (kind, literal) in [
            (PosKind::Tienda, "\"tienda\""),
            (PosKind::Metro, "\"metro\""),
            (PosKind::Online, "\"online\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), literal);
            let parsed: PosKind = serde_json::from_str(literal).unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
