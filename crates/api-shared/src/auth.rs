//! Authentication and access-control wire types.

/// Login request. `identifier` accepts a username or a RUT in any common
/// written form.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct LoginReq {
    pub identifier: String,
    pub password: String,
    /// When true the session gets a fixed 30-day expiry instead of ending
    /// with the browser session.
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct LoginRes {
    pub ok: bool,
    /// Human-readable role name, e.g. "Matrona" or "Super Administrador".
    pub display_role: String,
    /// Dashboard path the client should navigate to.
    pub dashboard: String,
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct LogoutRes {
    pub ok: bool,
    pub message: String,
}

/// Landing response for `/`: where the authenticated user should go next.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HomeRes {
    pub authenticated: bool,
    pub display_role: String,
    pub dashboard: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VerifyStatusRes {
    /// Whether the user already has a second factor on file.
    pub enrolled: bool,
    pub verified: bool,
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VerifyReq {
    pub code: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VerifyRes {
    pub ok: bool,
    pub message: String,
}

/// Directory listing entry for the user administration screens. Never carries
/// password or second-factor material.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UsuarioRes {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub rut: Option<String>,
    pub display_role: String,
    pub groups: Vec<String>,
    pub active: bool,
    pub superuser: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListUsuariosRes {
    pub usuarios: Vec<UsuarioRes>,
}

/// Body of every 403 the gatekeeper or a handler emits.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ForbiddenRes {
    pub error: String,
    pub detail: String,
}
