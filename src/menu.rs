use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::iter::Sum;
use std::ops::Add;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// A non-negative amount of money, held as whole cents.
///
/// Menu files write prices as plain decimals (`15.00`); they are rounded to
/// the nearest cent on load so totals add up exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u32);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u32) -> Self {
        Price(cents)
    }

    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) / 100.0 {
            return None;
        }
        Some(Price((value * 100.0).round() as u32))
    }

    pub fn cents(self) -> u32 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::from_decimal(value)
            .ok_or_else(|| de::Error::custom(format!("invalid price {}", value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Meal,
    Beverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub category: Category,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MenuItem {
    fn meal(id: u32, name: &str, cents: u32, description: &str) -> Self {
        Self {
            id,
            category: Category::Meal,
            name: name.to_string(),
            price: Price::from_cents(cents),
            description: Some(description.to_string()),
        }
    }

    fn beverage(id: u32, name: &str, cents: u32) -> Self {
        Self {
            id,
            category: Category::Beverage,
            name: name.to_string(),
            price: Price::from_cents(cents),
            description: None,
        }
    }

    /// Name as it reads on a receipt: meals are always "Marmita <name>".
    pub fn label(&self) -> String {
        match self.category {
            Category::Meal if !self.name.starts_with("Marmita") => {
                format!("Marmita {}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// Static catalog the conversation offers. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    name: String,
    #[serde(rename = "deliveryFee")]
    delivery_fee: Price,
    #[serde(rename = "deliveryWindow")]
    delivery_window: String,
    items: Vec<MenuItem>,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            name: "Sabor Caseiro".to_string(),
            delivery_fee: Price::from_cents(300),
            delivery_window: "30-45 minutos".to_string(),
            items: vec![
                MenuItem::meal(1, "Tradicional", 1500, "Arroz, feijão, bife, batata frita, salada"),
                MenuItem::meal(2, "Frango", 1400, "Arroz, feijão, frango grelhado, batata doce, salada"),
                MenuItem::meal(3, "Vegana", 1300, "Arroz integral, feijão, proteína de soja, legumes"),
                MenuItem::meal(4, "Fitness", 1600, "Arroz integral, feijão preto, frango, brócolis"),
                MenuItem::meal(5, "do Chefe", 1800, "Arroz, feijão tropeiro, picanha, mandioca"),
                MenuItem::beverage(6, "Refrigerante", 400),
                MenuItem::beverage(7, "Suco Natural", 500),
                MenuItem::beverage(8, "Água", 200),
            ],
        }
    }
}

impl Menu {
    /// Loads and validates a menu from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let menu: Menu = serde_json::from_str(content)?;
        menu.validate()?;
        Ok(menu)
    }

    fn validate(&self) -> AppResult<()> {
        if self.list_meals().next().is_none() {
            return Err(AppError::InvalidMenu("menu has no meals".to_string()));
        }
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(AppError::InvalidMenu(format!("duplicate item id {}", item.id)));
            }
            if item.name.trim().is_empty() {
                return Err(AppError::InvalidMenu(format!("item {} has no name", item.id)));
            }
        }
        Ok(())
    }

    pub fn list_meals(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.by_category(Category::Meal)
    }

    pub fn list_beverages(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.by_category(Category::Beverage)
    }

    /// 1-based lookup; anything outside the meal list is `None`.
    pub fn find_meal_by_position(&self, position: i64) -> Option<&MenuItem> {
        Self::nth(self.list_meals(), position)
    }

    pub fn find_beverage_by_position(&self, position: i64) -> Option<&MenuItem> {
        Self::nth(self.list_beverages(), position)
    }

    pub fn delivery_fee(&self) -> Price {
        self.delivery_fee
    }

    pub fn delivery_window(&self) -> &str {
        &self.delivery_window
    }

    pub fn restaurant_name(&self) -> &str {
        &self.name
    }

    fn by_category(&self, category: Category) -> impl Iterator<Item = &MenuItem> + '_ {
        self.items.iter().filter(move |item| item.category == category)
    }

    fn nth<'a>(mut items: impl Iterator<Item = &'a MenuItem>, position: i64) -> Option<&'a MenuItem> {
        let index = usize::try_from(position.checked_sub(1)?).ok()?;
        items.nth(index)
    }
}
