//! Staff member records.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use maternidad_types::{NonEmptyText, Rut};
use std::str::FromStr;

use crate::config::CoreConfig;
use crate::constants::PERSONA_JSON_FILENAME;
use crate::docstore::{DocStore, RecordId};
use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sexo {
    Femenino,
    Masculino,
}

impl Sexo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sexo::Femenino => "femenino",
            Sexo::Masculino => "masculino",
        }
    }
}

impl FromStr for Sexo {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "f" | "femenino" => Ok(Sexo::Femenino),
            "m" | "masculino" => Ok(Sexo::Masculino),
            other => Err(StoreError::InvalidInput(format!(
                "sexo must be 'F' or 'M', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Persona {
    pub id: RecordId,
    /// Canonical RUT, strict-validated at creation.
    pub rut: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

impl Persona {
    /// Age in completed years at the given date.
    pub fn edad_at(&self, on: NaiveDate) -> u32 {
        let mut years = on.year() - self.fecha_nacimiento.year();
        if (on.month(), on.day()) < (self.fecha_nacimiento.month(), self.fecha_nacimiento.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn edad(&self) -> u32 {
        self.edad_at(Utc::now().date_naive())
    }
}

#[derive(Debug, Clone)]
pub struct NewPersona {
    pub rut: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PersonaUpdate {
    pub nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<Sexo>,
}

pub struct PersonaService {
    store: DocStore,
}

impl PersonaService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            store: DocStore::new(config.personas_dir(), PERSONA_JSON_FILENAME),
        }
    }

    pub fn create(&self, input: NewPersona) -> StoreResult<Persona> {
        let rut = Rut::parse_strict(&input.rut)
            .map_err(|e| StoreError::InvalidInput(format!("rut: {e}")))?
            .canonical();
        let nombre = required_text("nombre", &input.nombre)?;
        let apellido_paterno = required_text("apellido_paterno", &input.apellido_paterno)?;
        let apellido_materno = required_text("apellido_materno", &input.apellido_materno)?;

        if self.list().iter().any(|p| p.rut == rut) {
            return Err(StoreError::InvalidInput(format!(
                "a persona with rut '{rut}' already exists"
            )));
        }

        let persona = Persona {
            id: RecordId::new(),
            rut,
            nombre,
            apellido_paterno,
            apellido_materno,
            fecha_nacimiento: input.fecha_nacimiento,
            sexo: input.sexo,
            activo: true,
            created_at: Utc::now(),
        };
        self.store.insert(&persona.id, &persona)?;
        Ok(persona)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<Persona> {
        self.store.read(id)
    }

    pub fn list(&self) -> Vec<Persona> {
        self.store.list()
    }

    pub fn count_active(&self) -> usize {
        self.list().iter().filter(|p| p.activo).count()
    }

    pub fn update(&self, id: &RecordId, changes: PersonaUpdate) -> StoreResult<Persona> {
        let mut persona: Persona = self.store.read(id)?;
        if let Some(nombre) = changes.nombre {
            persona.nombre = required_text("nombre", &nombre)?;
        }
        if let Some(apellido) = changes.apellido_paterno {
            persona.apellido_paterno = required_text("apellido_paterno", &apellido)?;
        }
        if let Some(apellido) = changes.apellido_materno {
            persona.apellido_materno = required_text("apellido_materno", &apellido)?;
        }
        if let Some(fecha) = changes.fecha_nacimiento {
            persona.fecha_nacimiento = fecha;
        }
        if let Some(sexo) = changes.sexo {
            persona.sexo = sexo;
        }
        self.store.replace(id, &persona)?;
        Ok(persona)
    }

    pub fn deactivate(&self, id: &RecordId) -> StoreResult<Persona> {
        let mut persona: Persona = self.store.read(id)?;
        persona.activo = false;
        self.store.replace(id, &persona)?;
        Ok(persona)
    }
}

fn required_text(field: &str, value: &str) -> StoreResult<String> {
    NonEmptyText::new(value)
        .map(|t| t.as_str().to_owned())
        .map_err(|_| StoreError::InvalidInput(format!("{field} cannot be empty")))
}
