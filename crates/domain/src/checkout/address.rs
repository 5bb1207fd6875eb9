use serde::{Deserialize, Serialize};

use crate::pricing::DeliveryType;

/// Delivery address collected in the first checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub zip_code: String,
    pub delivery_type: DeliveryType,
}

/// A required address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    FullName,
    Phone,
    Street,
    Number,
    Neighborhood,
    ZipCode,
}

impl AddressField {
    /// Message shown next to the field when it is left blank.
    pub fn message(&self) -> &'static str {
        match self {
            AddressField::FullName => "Informe o nome completo",
            AddressField::Phone => "Informe um telefone para contato",
            AddressField::Street => "Informe a rua",
            AddressField::Number => "Informe o número",
            AddressField::Neighborhood => "Informe o bairro",
            AddressField::ZipCode => "Informe o CEP",
        }
    }
}

/// Every field-level error found while validating an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressErrors {
    pub fields: Vec<AddressField>,
}

impl AddressErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: AddressField) -> bool {
        self.fields.contains(&field)
    }
}

impl std::fmt::Display for AddressErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(AddressField::message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl DeliveryAddress {
    /// Checks every required field, collecting all failures.
    pub fn validate(&self) -> Result<(), AddressErrors> {
        let required = [
            (AddressField::FullName, &self.full_name),
            (AddressField::Phone, &self.phone),
            (AddressField::Street, &self.street),
            (AddressField::Number, &self.number),
            (AddressField::Neighborhood, &self.neighborhood),
            (AddressField::ZipCode, &self.zip_code),
        ];

        let fields: Vec<AddressField> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AddressErrors { fields })
        }
    }
}
