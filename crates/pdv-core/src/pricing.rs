//! # Pricing Calculator
//!
//! Pure, deterministic, side-effect-free pricing arithmetic.
//!
//! ## Calculation Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  subtotal    = Σ (unit_price + Σ addon.price) × quantity            │
//! │  discount    = percent ? subtotal × bps/10000 : fixed               │
//! │  service_fee = enabled ? subtotal × 10% : 0                         │
//! │  tip         = subtotal × tip_bps/10000                             │
//! │  total       = max(0, subtotal − discount + service_fee + tip)      │
//! │  change      = cash ? max(0, cash_received − total) : 0             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All rates are basis points; all amounts integer centavos. Same input
//! always produces the same `Charges`.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Discount, PaymentMethod};

/// Service fee rate: fixed 10%.
pub const SERVICE_FEE_BPS: u32 = 1000;

/// Tip presets offered at the terminal, in basis points.
pub const TIP_PRESETS_BPS: [u32; 4] = [0, 500, 1000, 1500];

// =============================================================================
// Charge Parameters
// =============================================================================

/// Transaction-scoped pricing parameters entered by the operator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChargeParams {
    /// Transaction-level discount (percent or fixed amount).
    pub discount: Discount,

    /// Whether the fixed 10% service fee applies.
    pub service_fee: bool,

    /// Tip rate in basis points (one of the presets).
    pub tip_bps: u32,
}

// =============================================================================
// Charges
// =============================================================================

/// The computed charge breakdown for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    pub subtotal: Money,
    pub discount: Money,
    pub service_fee: Money,
    pub tip: Money,
    /// Never negative: an oversized discount clamps the total at zero.
    pub total: Money,
}

impl Charges {
    /// Computes the charge breakdown for a cart.
    ///
    /// ## Example
    /// ```rust
    /// use pdv_core::cart::{Cart, Product};
    /// use pdv_core::pricing::{ChargeParams, Charges};
    /// use pdv_core::{Discount, Money};
    ///
    /// let mut cart = Cart::new();
    /// let p = Product { id: "1".into(), name: "Prato".into(), price: Money::from_cents(2200) };
    /// cart.add_item(&p, vec![]).unwrap();
    /// cart.add_item(&p, vec![]).unwrap();
    ///
    /// let charges = Charges::compute(&cart, &ChargeParams {
    ///     discount: Discount::Percent(1000),
    ///     service_fee: true,
    ///     tip_bps: 1000,
    /// });
    ///
    /// assert_eq!(charges.subtotal.cents(), 4400);
    /// assert_eq!(charges.total.cents(), 4840); // 44.00 − 4.40 + 4.40 + 4.40
    /// ```
    pub fn compute(cart: &Cart, params: &ChargeParams) -> Charges {
        let subtotal = cart.subtotal();
        let discount = params.discount.amount_on(subtotal);
        let service_fee = if params.service_fee {
            subtotal.apply_rate(SERVICE_FEE_BPS)
        } else {
            Money::zero()
        };
        let tip = subtotal.apply_rate(params.tip_bps);
        let total = (subtotal - discount + service_fee + tip).clamp_zero();

        Charges {
            subtotal,
            discount,
            service_fee,
            tip,
            total,
        }
    }

    /// Change due for a payment.
    ///
    /// Non-cash methods never produce change.
    pub fn change_for(&self, method: PaymentMethod, cash_received: Money) -> Money {
        if method.is_cash() {
            (cash_received - self.total).clamp_zero()
        } else {
            Money::zero()
        }
    }

    /// The checkout gate: a cash payment needs enough cash tendered.
    ///
    /// This is a gating condition at the terminal, not an error.
    pub fn is_payment_sufficient(&self, method: PaymentMethod, cash_received: Money) -> bool {
        !method.is_cash() || cash_received >= self.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Product;

    fn cart_with(cents: i64, qty: i64) -> Cart {
        let mut cart = Cart::new();
        let p = Product {
            id: "1".to_string(),
            name: "Prato".to_string(),
            price: Money::from_cents(cents),
        };
        for _ in 0..qty {
            cart.add_item(&p, vec![]).unwrap();
        }
        cart
    }

    #[test]
    fn test_reference_example() {
        // [{price: 22.00, qty: 2}], 10% discount, service fee, 10% tip
        let cart = cart_with(2200, 2);
        let charges = Charges::compute(
            &cart,
            &ChargeParams {
                discount: Discount::Percent(1000),
                service_fee: true,
                tip_bps: 1000,
            },
        );

        assert_eq!(charges.subtotal.cents(), 4400);
        assert_eq!(charges.discount.cents(), 440);
        assert_eq!(charges.service_fee.cents(), 440);
        assert_eq!(charges.tip.cents(), 440);
        assert_eq!(charges.total.cents(), 4840);
    }

    #[test]
    fn test_no_extras() {
        let cart = cart_with(1000, 1);
        let charges = Charges::compute(&cart, &ChargeParams::default());

        assert_eq!(charges.subtotal.cents(), 1000);
        assert_eq!(charges.discount, Money::zero());
        assert_eq!(charges.service_fee, Money::zero());
        assert_eq!(charges.tip, Money::zero());
        assert_eq!(charges.total.cents(), 1000);
    }

    #[test]
    fn test_fixed_discount() {
        let cart = cart_with(1000, 2);
        let charges = Charges::compute(
            &cart,
            &ChargeParams {
                discount: Discount::Fixed(Money::from_cents(500)),
                ..Default::default()
            },
        );
        assert_eq!(charges.total.cents(), 1500);
    }

    #[test]
    fn test_total_never_negative() {
        // discount larger than subtotal clamps at zero, never rejected
        let cart = cart_with(1000, 1);
        let charges = Charges::compute(
            &cart,
            &ChargeParams {
                discount: Discount::Fixed(Money::from_cents(99_999)),
                ..Default::default()
            },
        );
        assert_eq!(charges.total, Money::zero());
    }

    #[test]
    fn test_change_cash_only() {
        let cart = cart_with(1000, 1);
        let charges = Charges::compute(&cart, &ChargeParams::default());

        let change = charges.change_for(PaymentMethod::Cash, Money::from_cents(2000));
        assert_eq!(change.cents(), 1000);

        // non-cash methods never produce change
        let change = charges.change_for(PaymentMethod::Card, Money::from_cents(2000));
        assert_eq!(change, Money::zero());
        let change = charges.change_for(PaymentMethod::Pix, Money::from_cents(2000));
        assert_eq!(change, Money::zero());
    }

    #[test]
    fn test_change_never_negative() {
        let cart = cart_with(1000, 1);
        let charges = Charges::compute(&cart, &ChargeParams::default());
        let change = charges.change_for(PaymentMethod::Cash, Money::from_cents(500));
        assert_eq!(change, Money::zero());
    }

    #[test]
    fn test_payment_gate() {
        let cart = cart_with(1000, 1);
        let charges = Charges::compute(&cart, &ChargeParams::default());

        assert!(!charges.is_payment_sufficient(PaymentMethod::Cash, Money::from_cents(999)));
        assert!(charges.is_payment_sufficient(PaymentMethod::Cash, Money::from_cents(1000)));
        // non-cash is always sufficient regardless of cash_received
        assert!(charges.is_payment_sufficient(PaymentMethod::Card, Money::zero()));
        assert!(charges.is_payment_sufficient(PaymentMethod::Pix, Money::zero()));
    }

    #[test]
    fn test_deterministic() {
        let cart = cart_with(2200, 2);
        let params = ChargeParams {
            discount: Discount::Percent(1000),
            service_fee: true,
            tip_bps: 500,
        };
        assert_eq!(
            Charges::compute(&cart, &params),
            Charges::compute(&cart, &params)
        );
    }

    #[test]
    fn test_empty_cart_all_zero() {
        let cart = Cart::new();
        let charges = Charges::compute(
            &cart,
            &ChargeParams {
                discount: Discount::Percent(1000),
                service_fee: true,
                tip_bps: 1000,
            },
        );
        assert_eq!(charges.subtotal, Money::zero());
        assert_eq!(charges.total, Money::zero());
    }
}
