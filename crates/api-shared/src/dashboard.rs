//! Per-role dashboard payloads. Each carries the counters that role's
//! landing page surfaces.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct AdminDashboardRes {
    pub total_usuarios: usize,
    pub total_personas: usize,
    pub total_pacientes: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MedicoDashboardRes {
    pub total_patologias: usize,
    pub patologias_alto_riesgo: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MatronaDashboardRes {
    pub fichas_activas: usize,
    pub ingresos_hoy: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct TensDashboardRes {
    pub administraciones_hoy: usize,
}
