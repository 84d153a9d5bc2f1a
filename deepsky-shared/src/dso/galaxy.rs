use std::fmt;

use log::warn;

use crate::fields::{FieldBlock, FieldError};

/// The Hubble classification of a galaxy.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GalaxyForm {
    S0,
    Sa,
    Sb,
    Sc,
    SBa,
    SBb,
    SBc,
    E0,
    E1,
    E2,
    E3,
    E4,
    E5,
    E6,
    E7,
    #[default]
    Irr,
}

impl GalaxyForm {
    pub const ALL: [Self; 16] = [
        Self::S0,
        Self::Sa,
        Self::Sb,
        Self::Sc,
        Self::SBa,
        Self::SBb,
        Self::SBc,
        Self::E0,
        Self::E1,
        Self::E2,
        Self::E3,
        Self::E4,
        Self::E5,
        Self::E6,
        Self::E7,
        Self::Irr,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::S0 => "S0",
            Self::Sa => "Sa",
            Self::Sb => "Sb",
            Self::Sc => "Sc",
            Self::SBa => "SBa",
            Self::SBb => "SBb",
            Self::SBc => "SBc",
            Self::E0 => "E0",
            Self::E1 => "E1",
            Self::E2 => "E2",
            Self::E3 => "E3",
            Self::E4 => "E4",
            Self::E5 => "E5",
            Self::E6 => "E6",
            Self::E7 => "E7",
            Self::Irr => "Irr",
        }
    }

    pub fn is_elliptical(self) -> bool {
        matches!(
            self,
            Self::E0 | Self::E1 | Self::E2 | Self::E3 | Self::E4 | Self::E5 | Self::E6 | Self::E7
        )
    }
}

impl fmt::Display for GalaxyForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Galaxy {
    form: GalaxyForm,
    detail: f32,
    custom_template: Option<String>,
}

impl Default for Galaxy {
    fn default() -> Self {
        Self {
            form: GalaxyForm::default(),
            detail: 1.0,
            custom_template: None,
        }
    }
}

impl Galaxy {
    /// Reads `Type`, `Detail` and `CustomTemplate`.
    ///
    /// Unknown forms fall back to [`GalaxyForm::Irr`].
    pub(crate) fn from_fields(fields: FieldBlock) -> Result<Self, FieldError> {
        let form = match fields.string("Type")? {
            Some(name) => GalaxyForm::from_name(name).unwrap_or_else(|| {
                warn!("unknown galaxy type {name:?}, using {}", GalaxyForm::Irr);
                GalaxyForm::Irr
            }),
            None => GalaxyForm::default(),
        };

        Ok(Self {
            form,
            detail: fields.number("Detail")?.map_or(1.0, |detail| detail as f32),
            custom_template: fields.string("CustomTemplate")?.map(str::to_owned),
        })
    }

    pub fn form(&self) -> GalaxyForm {
        self.form
    }

    pub fn detail(&self) -> f32 {
        self.detail
    }

    /// The name of a custom image used instead of the one for [`Self::form`].
    pub fn custom_template(&self) -> Option<&str> {
        self.custom_template.as_deref()
    }
}
