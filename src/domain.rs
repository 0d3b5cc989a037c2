use serde::{Deserialize, Serialize};

/// A product as stored by the server and cached by the dashboard.
///
/// Missing numeric fields decode as zero so a partially populated record can
/// still seed an edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// Mutable product fields carried by an update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub rating: Option<f64>,
}

impl ProductChanges {
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock_quantity) = self.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        if self.rating.is_some() {
            product.rating = self.rating;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_decodes_missing_numbers_as_zero() {
        let product: Product =
            serde_json::from_str(r#"{"productId":"p1","name":"Aloe Gel"}"#).unwrap();

        assert_eq!(product.price, 0.0);
        assert_eq!(product.stock_quantity, 0);
        assert_eq!(product.rating, None);
    }

    #[test]
    fn product_uses_camel_case_on_the_wire() {
        let product = Product {
            product_id: "p1".to_string(),
            name: "Sunscreen".to_string(),
            price: 12.5,
            stock_quantity: 4,
            rating: Some(4.5),
        };

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["productId"], "p1");
        assert_eq!(value["stockQuantity"], 4);
    }

    #[test]
    fn changes_only_touch_present_fields() {
        let mut product = Product {
            product_id: "p1".to_string(),
            name: "Aloe Gel".to_string(),
            price: 3.0,
            stock_quantity: 10,
            rating: Some(4.0),
        };

        ProductChanges {
            price: Some(5.0),
            ..Default::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.price, 5.0);
        assert_eq!(product.name, "Aloe Gel");
        assert_eq!(product.rating, Some(4.0));
    }
}
