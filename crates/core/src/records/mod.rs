//! Clinical record services.
//!
//! Each service owns one sharded document store under the configured data
//! directory and validates cross-record references against its neighbours at
//! creation time. Records are deactivated, never removed.

mod ingreso;
mod medicacion;
mod paciente;
mod patologia;
mod persona;

pub use ingreso::{Ingreso, IngresoService, NewIngreso};
pub use medicacion::{AdministracionMedicamento, MedicacionService, NewAdministracion};
pub use paciente::{NewPaciente, Paciente, PacienteService};
pub use patologia::{NewPatologia, NivelRiesgo, Patologia, PatologiaService};
pub use persona::{NewPersona, Persona, PersonaService, PersonaUpdate, Sexo};
