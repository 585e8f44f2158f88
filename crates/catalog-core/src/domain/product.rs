//! 상품 타입.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 상품 엔티티.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

/// 새 상품 입력
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    #[validate(custom(function = "non_negative_price"))]
    pub price: Decimal,
}

/// 상품 부분 수정 입력
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[serde(default)]
    #[validate(length(min = 1, message = "product name must not be empty"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "non_negative_price"))]
    pub price: Option<Decimal>,
}

impl ProductPatch {
    /// 패치를 기존 상품에 적용한 결과 반환.
    pub fn apply(self, mut product: Product) -> Product {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        product
    }
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("negative_price");
        err.message = Some("price must be non-negative".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_product_validation() {
        let ok = NewProduct {
            name: "Keyboard".to_string(),
            price: dec!(49.90),
        };
        assert!(ok.validate().is_ok());

        let free = NewProduct {
            price: dec!(0),
            ..ok.clone()
        };
        assert!(free.validate().is_ok());

        let negative = NewProduct {
            price: dec!(-1),
            ..ok.clone()
        };
        assert!(negative.validate().is_err());

        let unnamed = NewProduct {
            name: String::new(),
            ..ok
        };
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_patch_apply() {
        let product = Product {
            id: 7,
            name: "Mouse".to_string(),
            price: dec!(10),
        };

        let patched = ProductPatch {
            name: None,
            price: Some(dec!(12.5)),
        }
        .apply(product);

        assert_eq!(patched.id, 7);
        assert_eq!(patched.name, "Mouse");
        assert_eq!(patched.price, dec!(12.5));
    }
}
