use crate::api::models::points_of_sale::PosKind;
use crate::types::PosId;

#[derive(Debug, Clone)]
pub struct PosCreateDBRequest {
    pub name: String,
    pub location: String,
    pub kind: PosKind,
}

#[derive(Debug, Clone, Default)]
pub struct PosUpdateDBRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<PosKind>,
}

#[derive(Debug, Clone)]
pub struct PosDBResponse {
    pub id: PosId,
    pub name: String,
    pub location: String,
    pub kind: PosKind,
}
