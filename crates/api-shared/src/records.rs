//! Clinical record wire types.
//!
//! Dates travel as strings (`YYYY-MM-DD` for calendar dates, RFC 3339 for
//! timestamps) and are parsed at the handler boundary. Enumerated fields
//! (`sexo`, `nivel_riesgo`) travel as their lowercase names.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct CreatePersonaReq {
    pub rut: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    /// Birth date, `YYYY-MM-DD`.
    pub fecha_nacimiento: String,
    /// "F"/"femenino" or "M"/"masculino", case-insensitive.
    pub sexo: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UpdatePersonaReq {
    pub nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub fecha_nacimiento: Option<String>,
    pub sexo: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct PersonaRes {
    pub id: String,
    pub rut: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub fecha_nacimiento: String,
    pub sexo: String,
    pub edad: u32,
    pub activo: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListPersonasRes {
    pub personas: Vec<PersonaRes>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct CreatePacienteReq {
    pub persona_id: String,
    pub grupo_sanguineo: String,
    #[serde(default)]
    pub alergias: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct PacienteRes {
    pub id: String,
    pub persona_id: String,
    pub grupo_sanguineo: String,
    pub alergias: String,
    pub activo: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListPacientesRes {
    pub pacientes: Vec<PacienteRes>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct CreateIngresoReq {
    pub paciente_id: String,
    /// Admission timestamp, RFC 3339.
    pub fecha_ingreso: String,
    pub motivo: String,
    pub semanas_gestacion: u8,
    pub paridad: u8,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct IngresoRes {
    pub id: String,
    pub paciente_id: String,
    pub fecha_ingreso: String,
    pub motivo: String,
    pub semanas_gestacion: u8,
    pub paridad: u8,
    pub activa: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListIngresosRes {
    pub ingresos: Vec<IngresoRes>,
}

/// `administrado_por` is taken from the authenticated session, never from
/// the request body.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct CreateAdministracionReq {
    pub ingreso_id: String,
    pub medicamento: String,
    pub dosis: String,
    /// Administration timestamp, RFC 3339.
    pub fecha_hora_administracion: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct AdministracionRes {
    pub id: String,
    pub ingreso_id: String,
    pub medicamento: String,
    pub dosis: String,
    pub fecha_hora_administracion: String,
    pub administrado_por: String,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListAdministracionesRes {
    pub administraciones: Vec<AdministracionRes>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct CreatePatologiaReq {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    /// "bajo", "medio", "alto" or "critico" (accent tolerated).
    pub nivel_riesgo: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UpdatePatologiaNivelReq {
    pub nivel_riesgo: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct PatologiaRes {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    pub nivel_riesgo: String,
    pub activa: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListPatologiasRes {
    pub patologias: Vec<PatologiaRes>,
}
