//! Constants used throughout the maternidad core crate.
//!
//! This module contains all path, filename and session constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for service data storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "maternidad_data";

/// Filename for the identity directory document.
pub const USERS_FILENAME: &str = "users.json";

/// Filename for the provisioned group/permission document.
pub const GROUPS_FILENAME: &str = "groups.json";

/// Directory name for staff member records storage.
pub const PERSONAS_DIR_NAME: &str = "personas";

/// Directory name for patient records storage.
pub const PACIENTES_DIR_NAME: &str = "pacientes";

/// Directory name for admission records storage.
pub const INGRESOS_DIR_NAME: &str = "ingresos";

/// Directory name for medication administration records storage.
pub const ADMINISTRACIONES_DIR_NAME: &str = "administraciones";

/// Directory name for pathology records storage.
pub const PATOLOGIAS_DIR_NAME: &str = "patologias";

/// Filename for staff member JSON files.
pub const PERSONA_JSON_FILENAME: &str = "persona.json";

/// Filename for patient JSON files.
pub const PACIENTE_JSON_FILENAME: &str = "paciente.json";

/// Filename for admission JSON files.
pub const INGRESO_JSON_FILENAME: &str = "ingreso.json";

/// Filename for medication administration JSON files.
pub const ADMINISTRACION_JSON_FILENAME: &str = "administracion.json";

/// Filename for pathology JSON files.
pub const PATOLOGIA_JSON_FILENAME: &str = "patologia.json";

/// Name of the session cookie issued at login.
pub const SESSION_COOKIE_NAME: &str = "maternidad_session";

/// Lifetime of a remembered session, in seconds (30 days).
pub const REMEMBER_SESSION_SECONDS: i64 = 2_592_000;

/// Login key seeded for the default administrator account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Initial password for the seeded administrator account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Path of the login route, used by redirects from gated routes.
pub const LOGIN_PATH: &str = "/login";

/// Path of the second-factor challenge route.
pub const VERIFY_PATH: &str = "/verify";
