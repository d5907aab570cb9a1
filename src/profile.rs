//! Customer profile types and the categorical vocabulary shared by the CLI,
//! the batch reader, and the feature encoder.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Gender of the customer.
///
/// Integer codes follow the alphabetical order the models were trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];

    /// Trained categorical code: Female=0, Male=1, Other=2.
    pub fn code(self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
            Gender::Other => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Female" => Ok(Gender::Female),
            "Male" => Ok(Gender::Male),
            "Other" => Ok(Gender::Other),
            other => bail!("unknown gender '{}' (expected Female, Male or Other)", other),
        }
    }
}

/// Primary device used by the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Device {
    Desktop,
    Mobile,
    Tablet,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Desktop, Device::Mobile, Device::Tablet];

    /// Trained categorical code: Desktop=0, Mobile=1, Tablet=2.
    pub fn code(self) -> u8 {
        match self {
            Device::Desktop => 0,
            Device::Mobile => 1,
            Device::Tablet => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Desktop => "Desktop",
            Device::Mobile => "Mobile",
            Device::Tablet => "Tablet",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Desktop" => Ok(Device::Desktop),
            "Mobile" => Ok(Device::Mobile),
            "Tablet" => Ok(Device::Tablet),
            other => bail!("unknown device '{}' (expected Desktop, Mobile or Tablet)", other),
        }
    }
}

/// Country of the customer, limited to the markets the models were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Country {
    Australia,
    Brazil,
    Canada,
    France,
    Germany,
    India,
    Japan,
    #[serde(rename = "South Korea")]
    SouthKorea,
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    #[serde(rename = "United States")]
    UnitedStates,
}

impl Country {
    pub const ALL: [Country; 10] = [
        Country::Australia,
        Country::Brazil,
        Country::Canada,
        Country::France,
        Country::Germany,
        Country::India,
        Country::Japan,
        Country::SouthKorea,
        Country::UnitedKingdom,
        Country::UnitedStates,
    ];

    /// Trained categorical code, alphabetical: Australia=0 .. United States=9.
    pub fn code(self) -> u8 {
        match self {
            Country::Australia => 0,
            Country::Brazil => 1,
            Country::Canada => 2,
            Country::France => 3,
            Country::Germany => 4,
            Country::India => 5,
            Country::Japan => 6,
            Country::SouthKorea => 7,
            Country::UnitedKingdom => 8,
            Country::UnitedStates => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Country::Australia => "Australia",
            Country::Brazil => "Brazil",
            Country::Canada => "Canada",
            Country::France => "France",
            Country::Germany => "Germany",
            Country::India => "India",
            Country::Japan => "Japan",
            Country::SouthKorea => "South Korea",
            Country::UnitedKingdom => "United Kingdom",
            Country::UnitedStates => "United States",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Country {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for country in Country::ALL {
            if country.as_str() == trimmed {
                return Ok(country);
            }
        }
        bail!("unknown country '{}'", trimmed)
    }
}

/// Favorite shopping category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    Beauty,
    Books,
    Electronics,
    Fashion,
    Groceries,
    #[serde(rename = "Home & Garden")]
    HomeAndGarden,
    Sports,
    Toys,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Beauty,
        Category::Books,
        Category::Electronics,
        Category::Fashion,
        Category::Groceries,
        Category::HomeAndGarden,
        Category::Sports,
        Category::Toys,
    ];

    /// Trained categorical code, alphabetical: Beauty=0 .. Toys=7.
    pub fn code(self) -> u8 {
        match self {
            Category::Beauty => 0,
            Category::Books => 1,
            Category::Electronics => 2,
            Category::Fashion => 3,
            Category::Groceries => 4,
            Category::HomeAndGarden => 5,
            Category::Sports => 6,
            Category::Toys => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Beauty => "Beauty",
            Category::Books => "Books",
            Category::Electronics => "Electronics",
            Category::Fashion => "Fashion",
            Category::Groceries => "Groceries",
            Category::HomeAndGarden => "Home & Garden",
            Category::Sports => "Sports",
            Category::Toys => "Toys",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for category in Category::ALL {
            if category.as_str() == trimmed {
                return Ok(category);
            }
        }
        bail!("unknown category '{}'", trimmed)
    }
}

/// Parse a premium-membership cell as it appears in the form and in batch
/// CSVs (Yes/No).
pub fn premium_from_str(s: &str) -> crate::Result<bool> {
    match s.trim() {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => bail!("invalid premium value '{}' (expected Yes or No)", other),
    }
}

/// One customer as entered in the analysis form or one batch CSV row.
///
/// Numeric ranges mirror the form widgets; [`CustomerProfile::validate`]
/// enforces them at the input boundary so the encoder can stay total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub days_since_last_purchase: u32,
    pub account_age_days: u32,
    pub country: Country,
    pub age: u32,
    pub gender: Gender,
    pub device: Device,
    pub category: Category,
    pub total_orders: u32,
    pub total_spent: f64,
    pub is_premium: bool,
}

impl CustomerProfile {
    /// Derived feature: total_spent / total_orders, 0 when there are no
    /// orders (unreachable for validated profiles, where total_orders >= 1).
    pub fn avg_order_value(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.total_spent / f64::from(self.total_orders)
        }
    }

    /// Check the form's domain ranges. Categorical fields need no check
    /// here; the enums cannot hold out-of-vocabulary values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.days_since_last_purchase > 1000 {
            bail!(
                "days_since_last_purchase {} out of range 0..=1000",
                self.days_since_last_purchase
            );
        }
        if self.account_age_days > 730 {
            bail!("account_age_days {} out of range 0..=730", self.account_age_days);
        }
        if !(18..=100).contains(&self.age) {
            bail!("age {} out of range 18..=100", self.age);
        }
        if !(1..=500).contains(&self.total_orders) {
            bail!("total_orders {} out of range 1..=500", self.total_orders);
        }
        if !self.total_spent.is_finite() || !(0.0..=50_000.0).contains(&self.total_spent) {
            bail!("total_spent {} out of range 0..=50000", self.total_spent);
        }
        Ok(())
    }
}
