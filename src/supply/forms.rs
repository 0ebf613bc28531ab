//! Request bodies for node and product writes.
//!
//! Every field is optional at the serde level so that missing fields are
//! reported alongside other field errors instead of failing deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::database::models::{NewNode, NewProduct, NodeId, NodeUpdate, ProductUpdate};
use crate::supply::validation::{self as check, FieldErrors};

/// PUT replaces the whole resource; PATCH only what is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `POST /supply/nodes/create/`.
#[derive(Debug, Default, Deserialize)]
pub struct NodeDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    #[serde(default)]
    pub supplier: Option<NodeId>,
    #[serde(default)]
    pub debt_to_supplier: Option<Decimal>,
}

impl NodeDraft {
    pub fn validate(self) -> Result<NewNode, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = check::required_text(&mut errors, "name", self.name, 255);
        let email = check::email(&mut errors, "email", self.email, true);
        let phone = check::required_text(&mut errors, "phone", self.phone, 20);
        let country = check::required_text(&mut errors, "country", self.country, 100);
        let city = check::required_text(&mut errors, "city", self.city, 100);
        let street = check::required_text(&mut errors, "street", self.street, 100);
        let building_number = check::required_text(&mut errors, "building_number", self.building_number, 20);
        let debt = check::money(&mut errors, "debt_to_supplier", self.debt_to_supplier.unwrap_or_default());

        errors.finish(|| NewNode {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            country: country.unwrap_or_default(),
            city: city.unwrap_or_default(),
            street: street.unwrap_or_default(),
            building_number: building_number.unwrap_or_default(),
            supplier_id: self.supplier,
            debt_to_supplier: debt.unwrap_or_default(),
        })
    }
}

/// Body of `PUT|PATCH /supply/nodes/:id/update/`.
///
/// Has no `debt_to_supplier` field; see `supply::guard`.
#[derive(Debug, Default, Deserialize)]
pub struct NodeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub supplier: Option<Option<NodeId>>,
}

impl NodeChanges {
    pub fn validate(self, mode: WriteMode) -> Result<NodeUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = |errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize| match mode {
            WriteMode::Full => check::required_text(errors, field, value, max),
            WriteMode::Partial => check::optional_text(errors, field, value, max),
        };

        let update = NodeUpdate {
            name: text(&mut errors, "name", self.name, 255),
            email: check::email(&mut errors, "email", self.email, mode == WriteMode::Full),
            phone: text(&mut errors, "phone", self.phone, 20),
            country: text(&mut errors, "country", self.country, 100),
            city: text(&mut errors, "city", self.city, 100),
            street: text(&mut errors, "street", self.street, 100),
            building_number: text(&mut errors, "building_number", self.building_number, 20),
            // optional even on PUT: an absent key keeps the current supplier
            supplier_id: self.supplier,
        };

        errors.finish(|| update)
    }
}

/// Body of `POST /supply/products/create/`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub model: Option<String>,
    pub release_date: Option<String>,
    pub owner: Option<NodeId>,
}

impl ProductDraft {
    pub fn validate(self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = check::required_text(&mut errors, "name", self.name, 255);
        let model = check::required_text(&mut errors, "model", self.model, 100);
        let release_date = check::required_text(&mut errors, "release_date", self.release_date, 10)
            .and_then(|raw| check::date(&mut errors, "release_date", &raw));
        if self.owner.is_none() {
            errors.add("owner", check::REQUIRED);
        }

        errors.finish(|| NewProduct {
            name: name.unwrap_or_default(),
            model: model.unwrap_or_default(),
            release_date: release_date.unwrap_or_default(),
            owner_id: self.owner.unwrap_or_default(),
        })
    }
}

/// Body of `PUT|PATCH /supply/products/:id/update/`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub model: Option<String>,
    pub release_date: Option<String>,
    pub owner: Option<NodeId>,
}

impl ProductChanges {
    pub fn validate(self, mode: WriteMode) -> Result<ProductUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = |errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize| match mode {
            WriteMode::Full => check::required_text(errors, field, value, max),
            WriteMode::Partial => check::optional_text(errors, field, value, max),
        };

        let name = text(&mut errors, "name", self.name, 255);
        let model = text(&mut errors, "model", self.model, 100);
        let release_date = text(&mut errors, "release_date", self.release_date, 10)
            .and_then(|raw| check::date(&mut errors, "release_date", &raw));
        if mode == WriteMode::Full && self.owner.is_none() {
            errors.add("owner", check::REQUIRED);
        }

        errors.finish(|| ProductUpdate {
            name,
            model,
            release_date,
            owner_id: self.owner,
        })
    }
}
