//! Fleet models: manufacturers, drivers and the cars they drive.
//!
//! These are plain records. Storing them is up to the caller; the field
//! names in each [`ModelMeta`] are the contract with whatever persistence
//! layer does that.

use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use taxi_auth::user::user_field_defs;
use taxi_auth::AbstractUser;
use taxi_db::fields::{FieldDef, FieldType};
use taxi_db::model::{Model, ModelMeta};
use taxi_db::value::Value;

static MANUFACTURER_META: LazyLock<ModelMeta> = LazyLock::new(|| {
    ModelMeta::new(
        "taxi",
        "manufacturer",
        vec![
            FieldDef::new("id", FieldType::AutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField)
                .max_length(255)
                .unique(),
            FieldDef::new("country", FieldType::CharField).max_length(255),
        ],
    )
});

static DRIVER_META: LazyLock<ModelMeta> = LazyLock::new(|| {
    let mut fields = user_field_defs();
    fields.push(
        FieldDef::new("license_number", FieldType::CharField)
            .max_length(255)
            .unique(),
    );
    ModelMeta::new("taxi", "driver", fields)
});

static CAR_META: LazyLock<ModelMeta> = LazyLock::new(|| {
    ModelMeta::new(
        "taxi",
        "car",
        vec![
            FieldDef::new("id", FieldType::AutoField).primary_key(),
            FieldDef::new("model", FieldType::CharField).max_length(255),
            FieldDef::new(
                "manufacturer",
                FieldType::ForeignKey {
                    to: "taxi.manufacturer".into(),
                },
            ),
            FieldDef::new(
                "drivers",
                FieldType::ManyToManyField {
                    to: "taxi.driver".into(),
                },
            ),
        ],
    )
});

/// A car maker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manufacturer {
    pub id: Option<i64>,
    pub name: String,
    pub country: String,
}

impl Manufacturer {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            country: country.into(),
        }
    }
}

impl Model for Manufacturer {
    fn meta() -> &'static ModelMeta {
        &MANUFACTURER_META
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.as_str().into()),
            ("country", self.country.as_str().into()),
        ]
    }

    fn display(&self) -> String {
        format!("{} {}", self.name, self.country)
    }
}

/// A user who drives fleet cars.
///
/// Derefs to the embedded [`AbstractUser`], so `driver.username` and
/// `driver.check_password(..)` work directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Driver {
    #[serde(flatten)]
    pub user: AbstractUser,
    pub license_number: String,
}

impl Driver {
    pub fn new(username: impl Into<String>, license_number: impl Into<String>) -> Self {
        Self {
            user: AbstractUser::new(username),
            license_number: license_number.into(),
        }
    }
}

impl Deref for Driver {
    type Target = AbstractUser;

    fn deref(&self) -> &AbstractUser {
        &self.user
    }
}

impl DerefMut for Driver {
    fn deref_mut(&mut self) -> &mut AbstractUser {
        &mut self.user
    }
}

impl Model for Driver {
    fn meta() -> &'static ModelMeta {
        &DRIVER_META
    }

    fn pk(&self) -> Option<i64> {
        self.user.id
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        let mut values = self.user.field_values();
        values.push(("license_number", self.license_number.as_str().into()));
        values
    }

    fn display(&self) -> String {
        let full_name = self.user.full_name();
        if full_name.is_empty() {
            self.user.username.clone()
        } else {
            format!("{} ({full_name})", self.user.username)
        }
    }
}

/// A fleet car, its maker and the drivers assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Car {
    pub id: Option<i64>,
    pub model: String,
    /// Primary key of the [`Manufacturer`].
    pub manufacturer: i64,
    /// Primary keys of assigned [`Driver`]s.
    pub drivers: Vec<i64>,
}

impl Model for Car {
    fn meta() -> &'static ModelMeta {
        &CAR_META
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("model", self.model.as_str().into()),
            ("manufacturer", self.manufacturer.into()),
            ("drivers", self.drivers.clone().into()),
        ]
    }

    fn display(&self) -> String {
        self.model.clone()
    }
}
