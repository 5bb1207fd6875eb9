//! Shopping cart aggregate.

use catalog::Product;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities added to the cart must be at least 1.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The product is sold in sizes and none was chosen.
    #[error("Selecione um tamanho para o produto {product_id}")]
    SizeRequired { product_id: ProductId },

    /// The chosen size is not offered for the product.
    #[error("Tamanho {size} indisponível para o produto {product_id}")]
    SizeNotAvailable { product_id: ProductId, size: String },

    /// Merging would push a line past the largest representable quantity.
    #[error("Quantidade excede o limite para o produto {product_id}")]
    QuantityOverflow { product_id: ProductId },

    /// The cart could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One line of the cart: a product snapshot, a quantity and the chosen
/// size and color.
///
/// Two lines never share the same (product id, size, color) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CartLine {
    /// Returns true if this line has the given key.
    pub fn matches(&self, product_id: ProductId, size: Option<&str>, color: Option<&str>) -> bool {
        self.product.id == product_id
            && self.size.as_deref() == size
            && self.color.as_deref() == color
    }

    /// Returns price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

/// Ordered collection of cart lines with derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

// Query methods
impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from stored lines.
    ///
    /// Lines with a zero quantity are dropped and lines sharing a key are
    /// merged, so the result always holds the cart invariants. Merged
    /// quantities saturate at `u32::MAX`.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match cart.position(line.product.id, line.size.as_deref(), line.color.as_deref()) {
                Some(index) => {
                    let merged = &mut cart.lines[index].quantity;
                    *merged = merged.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line with the given key.
    pub fn line(
        &self,
        product_id: ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(product_id, size, color))
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the number of units across all lines, saturating at `u32::MAX`.
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |total, l| total.saturating_add(l.quantity))
    }

    /// Returns Σ price × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn position(&self, product_id: ProductId, size: Option<&str>, color: Option<&str>) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.matches(product_id, size, color))
    }
}

// Command methods
impl Cart {
    /// Adds `quantity` units of a product.
    ///
    /// Merges into the line with the same key, or appends a new line.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        match size {
            None if product.has_sizes() => {
                return Err(CartError::SizeRequired {
                    product_id: product.id,
                });
            }
            Some(size) if !product.offers_size(size) => {
                return Err(CartError::SizeNotAvailable {
                    product_id: product.id,
                    size: size.to_string(),
                });
            }
            _ => {}
        }

        match self.position(product.id, size, color) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow {
                        product_id: product.id,
                    })?;
            }
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity,
                size: size.map(str::to_string),
                color: color.map(str::to_string),
            }),
        }
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// A quantity below 1 or an unknown line leaves the cart unchanged.
    /// Returns true if the cart changed.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> bool {
        if new_quantity < 1 {
            return false;
        }
        match self.position(product_id, size, color) {
            Some(index) if self.lines[index].quantity != new_quantity => {
                self.lines[index].quantity = new_quantity;
                true
            }
            _ => false,
        }
    }

    /// Removes a line. Returns true if a line was removed.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> bool {
        match self.position(product_id, size, color) {
            Some(index) => {
                self.lines.remove(index);
                true
            }
            None => false,
        }
    }

    /// Takes checked-out lines out of the cart.
    ///
    /// Each matching line loses the checked-out quantity and is dropped
    /// once nothing is left. Lines added since the snapshot stay.
    /// Returns true if the cart changed.
    pub fn remove_lines(&mut self, checked_out: &[CartLine]) -> bool {
        let mut changed = false;
        for taken in checked_out {
            let Some(index) =
                self.position(taken.product.id, taken.size.as_deref(), taken.color.as_deref())
            else {
                continue;
            };
            let line = &mut self.lines[index];
            if line.quantity > taken.quantity {
                line.quantity -= taken.quantity;
            } else {
                self.lines.remove(index);
            }
            changed = true;
        }
        changed
    }

    /// Empties the cart. Returns true if there was anything to remove.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }
}
