//! The fleet's data-entry forms.
//!
//! All three forms are generated from model metadata. The two driver forms
//! attach the shared [`license_validator`] to `license_number`, so a bad
//! license is reported the same way whether a driver is being created or
//! updated.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use taxi_auth::hashers::PasswordHasher;
use taxi_auth::{PasswordPolicy, UserCreationForm};
use taxi_core::{TaxiError, TaxiResult, ValidationError};
use taxi_db::model::{choices_from, Model};
use taxi_db::value::Value;
use taxi_forms::model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
use taxi_forms::{BaseForm, Form, FormErrors, FormFieldDef, WidgetType};
use taxi_http::QueryDict;

use crate::license::license_validator;
use crate::models::{Car, Driver, Manufacturer};

const LICENSE_FIELD: &str = "license_number";

fn attach_license_rule(form: &mut BaseForm) -> TaxiResult<()> {
    let form_name = form.name().to_string();
    let field = form.field_mut(LICENSE_FIELD).ok_or_else(|| {
        TaxiError::Configuration(format!("{LICENSE_FIELD} is not a field of {form_name}"))
    })?;
    field.validators.push(license_validator());
    Ok(())
}

fn not_validated(what: &str) -> TaxiError {
    TaxiError::Validation(ValidationError::new(
        format!("The {what} could not be saved because the data didn't validate."),
        "invalid",
    ))
}

fn ensure_valid(form: &dyn Form, what: &str) -> TaxiResult<()> {
    if form.is_bound() && form.errors().is_empty() && !form.cleaned_data().is_empty() {
        Ok(())
    } else {
        Err(not_validated(what))
    }
}

fn cleaned_str<'a>(data: &'a HashMap<String, Value>, name: &str) -> &'a str {
    data.get(name).and_then(Value::as_str).unwrap_or_default()
}

macro_rules! delegate_form {
    ($ty:ty) => {
        #[async_trait]
        impl Form for $ty {
            fn fields(&self) -> &[FormFieldDef] {
                self.inner.fields()
            }

            fn initial(&self) -> &HashMap<String, Value> {
                self.inner.initial()
            }

            fn prefix(&self) -> Option<&str> {
                self.inner.prefix()
            }

            fn bind(&mut self, data: &QueryDict) {
                self.inner.bind(data);
            }

            fn is_bound(&self) -> bool {
                self.inner.is_bound()
            }

            async fn is_valid(&mut self) -> bool {
                self.inner.is_valid().await
            }

            fn errors(&self) -> &FormErrors {
                self.inner.errors()
            }

            fn cleaned_data(&self) -> &HashMap<String, Value> {
                self.inner.cleaned_data()
            }
        }
    };
}

// ============================================================================
// DriverCreationForm
// ============================================================================

/// Registers a new driver: username, license number and a password
/// entered twice.
#[derive(Debug)]
pub struct DriverCreationForm {
    inner: UserCreationForm,
}

impl DriverCreationForm {
    /// Builds the form with the default password policy and Argon2 hashing.
    pub fn new() -> TaxiResult<Self> {
        let config = ModelFormConfig::new(Driver::meta())
            .with_fields(ModelFormFields::include(["username", LICENSE_FIELD]));
        let mut inner = UserCreationForm::from_config(config)?.with_name("DriverCreationForm");
        attach_license_rule(inner.inner_mut())?;
        Ok(Self { inner })
    }

    /// Replaces the password policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<PasswordPolicy>) -> Self {
        self.inner = self.inner.with_policy(policy);
        self
    }

    /// Replaces the password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.inner = self.inner.with_hasher(hasher);
        self
    }

    /// Builds an unsaved driver with a hashed password.
    pub async fn save(&self) -> TaxiResult<Driver> {
        ensure_valid(self, "driver")?;
        let user = self.inner.save().await?;
        let license_number = cleaned_str(self.cleaned_data(), LICENSE_FIELD).to_string();
        Ok(Driver {
            user,
            license_number,
        })
    }
}

delegate_form!(DriverCreationForm);

// ============================================================================
// DriverLicenseUpdateForm
// ============================================================================

/// Changes the license number of an existing driver.
#[derive(Debug)]
pub struct DriverLicenseUpdateForm {
    inner: BaseForm,
    instance: Driver,
}

impl DriverLicenseUpdateForm {
    /// Builds the form for `instance`, showing its current license number.
    pub fn new(instance: Driver) -> TaxiResult<Self> {
        let config = ModelFormConfig::new(Driver::meta())
            .with_fields(ModelFormFields::include([LICENSE_FIELD]));
        let initial = HashMap::from([(
            LICENSE_FIELD.to_string(),
            Value::from(instance.license_number.as_str()),
        )]);
        let mut inner = BaseForm::new(generate_form_fields(&config)?)
            .with_name("DriverLicenseUpdateForm")
            .with_initial(initial);
        attach_license_rule(&mut inner)?;
        Ok(Self { inner, instance })
    }

    /// The driver being edited.
    pub const fn instance(&self) -> &Driver {
        &self.instance
    }

    /// Returns the driver with the new license number applied.
    pub fn save(&self) -> TaxiResult<Driver> {
        ensure_valid(self, "driver")?;
        let mut driver = self.instance.clone();
        driver.license_number = cleaned_str(self.cleaned_data(), LICENSE_FIELD).to_string();
        Ok(driver)
    }
}

delegate_form!(DriverLicenseUpdateForm);

// ============================================================================
// CarForm
// ============================================================================

/// Creates or edits a car.
///
/// `manufacturer` offers the given manufacturers; `drivers` offers the
/// given drivers as checkboxes and may be left empty.
#[derive(Debug)]
pub struct CarForm {
    inner: BaseForm,
    instance: Option<Car>,
}

impl CarForm {
    /// Builds an empty form for a new car.
    pub fn new(manufacturers: &[Manufacturer], drivers: &[Driver]) -> TaxiResult<Self> {
        let config = ModelFormConfig::new(Car::meta())
            .with_fields(ModelFormFields::All)
            .with_choices("manufacturer", choices_from(manufacturers))
            .with_choices("drivers", choices_from(drivers))
            .with_widget("drivers", WidgetType::CheckboxSelectMultiple)
            .with_required("drivers", false);
        let inner = BaseForm::new(generate_form_fields(&config)?).with_name("CarForm");
        Ok(Self {
            inner,
            instance: None,
        })
    }

    /// Builds a form editing `car`, showing its current values.
    pub fn for_instance(
        car: Car,
        manufacturers: &[Manufacturer],
        drivers: &[Driver],
    ) -> TaxiResult<Self> {
        let mut form = Self::new(manufacturers, drivers)?;
        let initial: HashMap<String, Value> = car
            .field_values()
            .into_iter()
            .filter(|(name, _)| form.inner.field(name).is_some())
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        form.inner = form.inner.with_initial(initial);
        form.instance = Some(car);
        Ok(form)
    }

    /// Returns the car described by the cleaned data. When editing, the
    /// original primary key is kept.
    pub fn save(&self) -> TaxiResult<Car> {
        ensure_valid(self, "car")?;
        let data = self.cleaned_data();
        let manufacturer = data
            .get("manufacturer")
            .and_then(Value::as_int)
            .ok_or_else(|| not_validated("car"))?;
        let drivers = data
            .get("drivers")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_int)
            .collect();
        Ok(Car {
            id: self.instance.as_ref().and_then(|car| car.id),
            model: cleaned_str(data, "model").to_string(),
            manufacturer,
            drivers,
        })
    }
}

delegate_form!(CarForm);

#[cfg(test)]
mod tests {
    use taxi_auth::Pbkdf2Hasher;

    use super::*;
    use crate::license::{INVALID_LICENSE_FORMAT, INVALID_LICENSE_MESSAGE};

    fn names(form: &dyn Form) -> Vec<&str> {
        form.fields().iter().map(|f| f.name.as_str()).collect()
    }

    fn driver(id: i64, username: &str) -> Driver {
        let mut d = Driver::new(username, "ABC12345");
        d.user.id = Some(id);
        d
    }

    fn manufacturers() -> Vec<Manufacturer> {
        vec![
            Manufacturer {
                id: Some(1),
                ..Manufacturer::new("Toyota", "Japan")
            },
            Manufacturer {
                id: Some(2),
                ..Manufacturer::new("Skoda", "Czechia")
            },
        ]
    }

    #[test]
    fn test_driver_creation_field_order() {
        let form = DriverCreationForm::new().unwrap();
        assert_eq!(
            names(&form),
            vec!["username", LICENSE_FIELD, "password1", "password2"]
        );
    }

    #[test]
    fn test_both_driver_forms_share_the_validator() {
        let create = DriverCreationForm::new().unwrap();
        let update = DriverLicenseUpdateForm::new(driver(1, "jdoe")).unwrap();
        let find = |form: &dyn Form| {
            form.fields()
                .iter()
                .find(|f| f.name == LICENSE_FIELD)
                .map(|f| Arc::clone(&f.validators[0]))
                .unwrap()
        };
        assert!(Arc::ptr_eq(&find(&create), &find(&update)));
        assert!(Arc::ptr_eq(&find(&create), &license_validator()));
    }

    #[tokio::test]
    async fn test_driver_creation_bad_license() {
        let mut form = DriverCreationForm::new()
            .unwrap()
            .with_hasher(Arc::new(Pbkdf2Hasher { iterations: 1000 }));
        form.bind(&QueryDict::parse(
            "username=jdoe&license_number=abc12345\
             &password1=kestrel-junction-41&password2=kestrel-junction-41",
        ));
        assert!(!form.is_valid().await);
        let errors = &form.errors()[LICENSE_FIELD];
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, INVALID_LICENSE_MESSAGE);
        assert_eq!(errors[0].code, INVALID_LICENSE_FORMAT);
        assert_eq!(form.errors().len(), 1);
        assert!(form.save().await.is_err());
    }

    #[tokio::test]
    async fn test_driver_creation_saves_driver() {
        let mut form = DriverCreationForm::new()
            .unwrap()
            .with_hasher(Arc::new(Pbkdf2Hasher { iterations: 1000 }));
        form.bind(&QueryDict::parse(
            "username=jdoe&license_number=+ABC12345+\
             &password1=kestrel-junction-41&password2=kestrel-junction-41",
        ));
        assert!(form.is_valid().await, "{:?}", form.errors());
        let driver = form.save().await.unwrap();
        assert_eq!(driver.username, "jdoe");
        assert_eq!(driver.license_number, "ABC12345");
        assert!(driver.id.is_none());
        assert!(driver.check_password("kestrel-junction-41").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_form_initial_and_save() {
        let mut form = DriverLicenseUpdateForm::new(driver(4, "jdoe")).unwrap();
        assert_eq!(names(&form), vec![LICENSE_FIELD]);
        assert_eq!(form.initial()[LICENSE_FIELD], Value::from("ABC12345"));

        form.bind(&QueryDict::parse("license_number=XYZ54321&username=ignored"));
        assert!(form.is_valid().await);
        let updated = form.save().unwrap();
        assert_eq!(updated.license_number, "XYZ54321");
        assert_eq!(updated.username, "jdoe");
        assert_eq!(updated.id, Some(4));
        assert_eq!(form.instance().license_number, "ABC12345");
    }

    #[tokio::test]
    async fn test_update_form_rejects_bad_license() {
        let mut form = DriverLicenseUpdateForm::new(driver(4, "jdoe")).unwrap();
        form.bind(&QueryDict::parse("license_number=ABCD1234"));
        assert!(!form.is_valid().await);
        assert_eq!(
            form.errors()[LICENSE_FIELD][0].message,
            INVALID_LICENSE_MESSAGE
        );
        assert!(form.save().is_err());
    }

    #[tokio::test]
    async fn test_update_form_requires_license() {
        let mut form = DriverLicenseUpdateForm::new(driver(4, "jdoe")).unwrap();
        form.bind(&QueryDict::new());
        assert!(!form.is_valid().await);
        assert_eq!(form.errors()[LICENSE_FIELD][0].code, "required");
    }

    #[test]
    fn test_car_form_fields() {
        let form = CarForm::new(&manufacturers(), &[driver(3, "amir")]).unwrap();
        assert_eq!(names(&form), vec!["model", "manufacturer", "drivers"]);
        let drivers = form.fields().iter().find(|f| f.name == "drivers").unwrap();
        assert_eq!(drivers.widget, WidgetType::CheckboxSelectMultiple);
        assert!(!drivers.required);
        assert_eq!(
            drivers.field_type.choices().unwrap(),
            &[("3".to_string(), "amir".to_string())]
        );
    }

    #[tokio::test]
    async fn test_car_form_save() {
        let drivers = [driver(3, "amir"), driver(5, "bea")];
        let mut form = CarForm::new(&manufacturers(), &drivers).unwrap();
        form.bind(&QueryDict::parse(
            "model=Octavia&manufacturer=2&drivers=5&drivers=3",
        ));
        assert!(form.is_valid().await, "{:?}", form.errors());
        let car = form.save().unwrap();
        assert_eq!(car.id, None);
        assert_eq!(car.model, "Octavia");
        assert_eq!(car.manufacturer, 2);
        assert_eq!(car.drivers, vec![5, 3]);
    }

    #[tokio::test]
    async fn test_car_form_edit_keeps_pk() {
        let car = Car {
            id: Some(9),
            model: "Corolla".into(),
            manufacturer: 1,
            drivers: vec![3],
        };
        let mut form = CarForm::for_instance(car, &manufacturers(), &[driver(3, "amir")]).unwrap();
        assert_eq!(form.initial()["model"], Value::from("Corolla"));
        assert!(!form.initial().contains_key("id"));

        form.bind(&QueryDict::parse("model=Corolla+Cross&manufacturer=1"));
        assert!(form.is_valid().await);
        let saved = form.save().unwrap();
        assert_eq!(saved.id, Some(9));
        assert_eq!(saved.model, "Corolla Cross");
        assert!(saved.drivers.is_empty());
    }
}
