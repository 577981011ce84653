//! # Cart Engine
//!
//! In-memory ordered collection of line items with merge/split rules.
//!
//! ## Identity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Line Identity & Merging                          │
//! │                                                                     │
//! │  Identity key = (product_id, note)                                  │
//! │                                                                     │
//! │  add "X-Burger"            ──► [X-Burger ×1]                        │
//! │  add "X-Burger" again      ──► [X-Burger ×2]        (merged)        │
//! │  add "X-Burger" + bacon    ──► [X-Burger ×2,                        │
//! │                                 X-Burger+bacon ×1]  (addons never   │
//! │                                                      merge)         │
//! │  note "sem cebola" on the  ──► [X-Burger+bacon ×1,                  │
//! │  bare line                      X-Burger "sem cebola" ×2]           │
//! │                                 (new identity, re-appended)         │
//! │                                                                     │
//! │  Among addon-free lines, no two ever share an identity key.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The cart is owned exclusively by the active transaction. It is
//! destroyed on successful checkout or explicit clear, never shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Product Projection
// =============================================================================

/// The cart's view of a catalog product.
///
/// The menu catalog is an external collaborator; the cart only needs the
/// identity, display name, and the price in force when the item is rung up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
}

// =============================================================================
// Addon
// =============================================================================

/// An addon attached to a cart line (e.g. extra bacon).
///
/// Immutable once attached: the price is frozen alongside the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    /// Non-negative; validated when the line is added.
    pub price: Money,
}

// =============================================================================
// Line Key
// =============================================================================

/// Identity key for cart lines: (product id, note).
///
/// A noted line and an un-noted line of the same product never merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: String,
    pub note: Option<String>,
}

impl LineKey {
    /// Key for a bare (note-less) line of a product.
    pub fn bare(product_id: impl Into<String>) -> Self {
        LineKey {
            product_id: product_id.into(),
            note: None,
        }
    }

    /// Key for a noted line.
    pub fn noted(product_id: impl Into<String>, note: impl Into<String>) -> Self {
        LineKey {
            product_id: product_id.into(),
            note: Some(note.into()),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line item in the cart.
///
/// ## Price Freezing
/// Unit price and addon prices are captured when the item is added. If
/// the catalog price changes afterwards, this line keeps the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in centavos at time of adding (frozen).
    pub unit_price: Money,

    /// Always ≥ 1; a line that would drop to 0 is removed instead.
    pub quantity: i64,

    /// Kitchen note; part of the line identity.
    pub note: Option<String>,

    /// Addons frozen onto this line. Lines with addons never merge.
    pub addons: Vec<Addon>,

    /// When this line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn new(product: &Product, addons: Vec<Addon>) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            note: None,
            addons,
            added_at: Utc::now(),
        }
    }

    /// The identity key of this line.
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            note: self.note.clone(),
        }
    }

    #[inline]
    pub fn has_addons(&self) -> bool {
        !self.addons.is_empty()
    }

    /// Sum of addon prices per unit.
    pub fn addon_total(&self) -> Money {
        self.addons.iter().map(|a| a.price).sum()
    }

    /// Line total: (unit_price + addon_total) × quantity.
    pub fn line_total(&self) -> Money {
        (self.unit_price + self.addon_total()).multiply_quantity(self.quantity)
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.note == key.note
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The active cart.
///
/// ## Invariants
/// - No line ever has quantity ≤ 0
/// - Among addon-free lines, no two share an identity key
/// - `item_count()` always equals the sum of line quantities
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - No addons: merges into an existing bare line of the same product
    ///   (quantity + 1), or appends a new line of quantity 1.
    /// - With addons: always appends a new line. Addon combinations are
    ///   distinct choices; collapsing them would lose what was ordered.
    pub fn add_item(&mut self, product: &Product, addons: Vec<Addon>) -> CoreResult<()> {
        for addon in &addons {
            if addon.price.is_negative() {
                return Err(ValidationError::MustBeNonNegative {
                    field: format!("addon '{}' price", addon.name),
                }
                .into());
            }
        }

        if addons.is_empty() {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|l| l.product_id == product.id && l.note.is_none() && !l.has_addons())
            {
                let new_qty = line.quantity + 1;
                if new_qty > MAX_LINE_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: new_qty,
                        max: MAX_LINE_QUANTITY,
                    });
                }
                line.quantity = new_qty;
                return Ok(());
            }
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::new(product, addons));
        Ok(())
    }

    /// Adjusts the quantity of the first line matching `key` by `delta`.
    ///
    /// A resulting quantity ≤ 0 removes the line.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> CoreResult<()> {
        let Some(pos) = self.lines.iter().position(|l| l.matches(key)) else {
            return Err(CoreError::LineNotFound {
                product_id: key.product_id.clone(),
                note: key.note.clone(),
            });
        };

        let new_qty = self.lines[pos].quantity + delta;
        if new_qty <= 0 {
            self.lines.remove(pos);
            return Ok(());
        }
        if new_qty > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines[pos].quantity = new_qty;
        Ok(())
    }

    /// Removes every line matching `key`.
    pub fn remove_line(&mut self, key: &LineKey) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| !l.matches(key));

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound {
                product_id: key.product_id.clone(),
                note: key.note.clone(),
            })
        } else {
            Ok(())
        }
    }

    /// Attaches a kitchen note to the bare line of `product_id`.
    ///
    /// The line moves to a new identity key (note is part of identity), so
    /// it will never merge with un-noted instances of the same product.
    /// If an addon-free line already exists under the target key, the
    /// quantities merge so no two lines share a key.
    pub fn attach_note(&mut self, product_id: &str, note: &str) -> CoreResult<()> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ValidationError::Required {
                field: "note".to_string(),
            }
            .into());
        }

        let Some(pos) = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id && l.note.is_none() && !l.has_addons())
        else {
            return Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
                note: None,
            });
        };

        let mut line = self.lines.remove(pos);
        line.note = Some(note.to_string());

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&line.key()) && !l.has_addons())
        {
            existing.quantity += line.quantity;
        } else {
            self.lines.push(line);
        }
        Ok(())
    }

    /// Empties the cart.
    ///
    /// Transaction-scoped parameters (discount, tip, service fee,
    /// customer, table) live on the surrounding transaction and are reset
    /// by its own `clear`.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines (what the badge on the cart shows).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Subtotal: Σ (unit_price + addon_total) × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
        }
    }

    fn bacon() -> Addon {
        Addon {
            id: "a1".to_string(),
            name: "Bacon".to_string(),
            price: Money::from_cents(300),
        }
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new();
        let p = product("1", 2200);

        cart.add_item(&p, vec![]).unwrap();
        cart.add_item(&p, vec![]).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal().cents(), 4400);
    }

    #[test]
    fn test_addon_lines_never_merge() {
        let mut cart = Cart::new();
        let p = product("1", 2200);

        cart.add_item(&p, vec![]).unwrap();
        cart.add_item(&p, vec![bacon()]).unwrap();
        cart.add_item(&p, vec![bacon()]).unwrap();

        // bare line merged nothing; each addon add is its own line
        assert_eq!(cart.line_count(), 3);
        assert_eq!(cart.item_count(), 3);
        // 2200 + 2×(2200+300)
        assert_eq!(cart.subtotal().cents(), 2200 + 2 * 2500);
    }

    #[test]
    fn test_subtotal_includes_addons() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![bacon()]).unwrap();
        assert_eq!(cart.subtotal().cents(), 2500);
    }

    #[test]
    fn test_negative_addon_price_rejected() {
        let mut cart = Cart::new();
        let mut a = bacon();
        a.price = Money::from_cents(-50);
        let err = cart.add_item(&product("1", 2200), vec![a]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new();
        let p = product("1", 2200);
        cart.add_item(&p, vec![]).unwrap();
        cart.add_item(&p, vec![]).unwrap();

        cart.update_quantity(&LineKey::bare("1"), -2).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_delta() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![]).unwrap();

        cart.update_quantity(&LineKey::bare("1"), 3).unwrap();
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity(&LineKey::bare("1"), -1).unwrap();
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_no_line_with_nonpositive_quantity_ever() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![]).unwrap();
        cart.update_quantity(&LineKey::bare("1"), -5).unwrap();

        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![]).unwrap();
        cart.add_item(&product("2", 1500), vec![]).unwrap();

        cart.remove_line(&LineKey::bare("1")).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].product_id, "2");

        assert!(cart.remove_line(&LineKey::bare("1")).is_err());
    }

    #[test]
    fn test_attach_note_creates_distinct_identity() {
        let mut cart = Cart::new();
        let p = product("1", 2200);
        cart.add_item(&p, vec![]).unwrap();
        cart.attach_note("1", "sem cebola").unwrap();

        // noted line never merges with a fresh bare add
        cart.add_item(&p, vec![]).unwrap();

        assert_eq!(cart.line_count(), 2);
        let keys: Vec<LineKey> = cart.lines().iter().map(|l| l.key()).collect();
        assert!(keys.contains(&LineKey::noted("1", "sem cebola")));
        assert!(keys.contains(&LineKey::bare("1")));
    }

    #[test]
    fn test_attach_note_merges_into_existing_noted_line() {
        let mut cart = Cart::new();
        let p = product("1", 2200);

        cart.add_item(&p, vec![]).unwrap();
        cart.attach_note("1", "sem cebola").unwrap();
        cart.add_item(&p, vec![]).unwrap();
        cart.attach_note("1", "sem cebola").unwrap();

        // keys stay unique among addon-free lines
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_attach_blank_note_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![]).unwrap();
        assert!(cart.attach_note("1", "   ").is_err());
    }

    #[test]
    fn test_identity_keys_unique_after_operations() {
        let mut cart = Cart::new();
        let p1 = product("1", 2200);
        let p2 = product("2", 1500);

        cart.add_item(&p1, vec![]).unwrap();
        cart.add_item(&p1, vec![]).unwrap();
        cart.add_item(&p2, vec![]).unwrap();
        cart.attach_note("1", "bem passado").unwrap();
        cart.add_item(&p1, vec![]).unwrap();
        cart.update_quantity(&LineKey::bare("2"), 2).unwrap();

        let keys: Vec<LineKey> = cart
            .lines()
            .iter()
            .filter(|l| !l.has_addons())
            .map(|l| l.key())
            .collect();
        let unique: std::collections::HashSet<&LineKey> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 2200), vec![]).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_item_count_matches_quantity_sum() {
        let mut cart = Cart::new();
        let p1 = product("1", 2200);
        cart.add_item(&p1, vec![]).unwrap();
        cart.add_item(&p1, vec![]).unwrap();
        cart.add_item(&product("2", 800), vec![bacon()]).unwrap();

        let sum: i64 = cart.lines().iter().map(|l| l.quantity).sum();
        assert_eq!(cart.item_count(), sum);
        assert_eq!(cart.item_count(), 3);
    }
}
