//! Pure cart-state reducer.
//!
//! Every optimistic patch to the local cart goes through [`apply`], so the
//! aggregate recomputation (`subtotal`, `total_items`) has exactly one
//! implementation. Actions that would violate the quantity bounds leave the
//! cart untouched; callers check [`CartAction::is_applicable`] first so
//! they can skip the network call as well.

use bettabeal_core::{CartItemId, ProductId, Rupiah};

use crate::api::CartData;

/// A confirmed cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// `quantity` units of a product were added at `unit_price`.
    ItemAdded {
        product_id: ProductId,
        quantity: u32,
        unit_price: Rupiah,
    },
    /// A line lost one unit. Never takes a line below 1.
    ItemDecremented { cart_item_id: CartItemId },
    /// A line was deleted.
    ItemRemoved { cart_item_id: CartItemId },
    /// A line's quantity was set. Must lie within `[1, stock]`.
    QuantitySet {
        cart_item_id: CartItemId,
        quantity: u32,
        stock: u32,
    },
}

impl CartAction {
    /// Whether applying the action would change the cart.
    #[must_use]
    pub fn is_applicable(&self, cart: &CartData) -> bool {
        match *self {
            Self::ItemAdded {
                product_id,
                quantity,
                ..
            } => {
                quantity > 0
                    && cart.total_items.checked_add(quantity).is_some()
                    && cart
                        .items
                        .iter()
                        .filter(|item| item.product.product_id == product_id)
                        .all(|item| item.quantity.checked_add(quantity).is_some())
            }
            Self::ItemDecremented { cart_item_id } => {
                find(cart, cart_item_id).is_some_and(|item| item.quantity > 1)
            }
            Self::ItemRemoved { cart_item_id } => find(cart, cart_item_id).is_some(),
            Self::QuantitySet {
                cart_item_id,
                quantity,
                stock,
            } => (1..=stock).contains(&quantity) && find(cart, cart_item_id).is_some(),
        }
    }
}

/// Apply an action in place. Returns `false` (and changes nothing) when the
/// action is not applicable.
pub fn apply(cart: &mut CartData, action: &CartAction) -> bool {
    if !action.is_applicable(cart) {
        return false;
    }

    match *action {
        CartAction::ItemAdded {
            product_id,
            quantity,
            unit_price,
        } => {
            // A product not yet listed only moves the aggregates; its line
            // shows up on the next fetch.
            if let Some(item) = cart
                .items
                .iter_mut()
                .find(|item| item.product.product_id == product_id)
            {
                item.quantity += quantity;
                item.total_price = item.product.price.times(item.quantity);
            }
            cart.subtotal += unit_price.times(quantity);
            cart.total_items += quantity;
        }
        CartAction::ItemDecremented { cart_item_id } => {
            if let Some(item) = cart
                .items
                .iter_mut()
                .find(|item| item.cart_item_id == cart_item_id)
            {
                item.quantity -= 1;
                item.total_price = item.product.price.times(item.quantity);
                cart.subtotal -= item.product.price;
                cart.total_items = cart.total_items.saturating_sub(1);
            }
        }
        CartAction::ItemRemoved { cart_item_id } => {
            if let Some(index) = cart
                .items
                .iter()
                .position(|item| item.cart_item_id == cart_item_id)
            {
                let removed = cart.items.remove(index);
                cart.subtotal -= removed.total_price;
                cart.total_items = cart.total_items.saturating_sub(removed.quantity);
            }
        }
        CartAction::QuantitySet {
            cart_item_id,
            quantity,
            ..
        } => {
            if let Some(item) = cart
                .items
                .iter_mut()
                .find(|item| item.cart_item_id == cart_item_id)
            {
                let old = item.quantity;
                item.quantity = quantity;
                item.total_price = item.product.price.times(quantity);
                if quantity >= old {
                    let delta = quantity - old;
                    cart.subtotal += item.product.price.times(delta);
                    cart.total_items = cart.total_items.saturating_add(delta);
                } else {
                    let delta = old - quantity;
                    cart.subtotal -= item.product.price.times(delta);
                    cart.total_items = cart.total_items.saturating_sub(delta);
                }
            }
        }
    }
    true
}

fn find(cart: &CartData, cart_item_id: CartItemId) -> Option<&crate::api::CartItem> {
    cart.items
        .iter()
        .find(|item| item.cart_item_id == cart_item_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CartItem, CartProduct};

    fn line(id: i64, product: i64, price: i64, quantity: u32) -> CartItem {
        CartItem {
            cart_item_id: CartItemId::new(id),
            product: CartProduct {
                product_id: ProductId::new(product),
                name: format!("Product {product}"),
                price: Rupiah::from_whole(price),
            },
            quantity,
            total_price: Rupiah::from_whole(price).times(quantity),
        }
    }

    fn cart() -> CartData {
        let items = vec![line(1, 10, 10_000, 2), line(2, 20, 5_000, 1)];
        CartData {
            total_items: items.iter().map(|i| i.quantity).sum(),
            subtotal: items.iter().map(|i| i.total_price).sum(),
            items,
        }
    }

    #[test]
    fn test_quantity_set_out_of_bounds_is_noop() {
        for quantity in [0, 6, 100] {
            let mut state = cart();
            let action = CartAction::QuantitySet {
                cart_item_id: CartItemId::new(1),
                quantity,
                stock: 5,
            };
            assert!(!action.is_applicable(&state));
            assert!(!apply(&mut state, &action));
            assert_eq!(state, cart());
        }
    }

    #[test]
    fn test_quantity_set_within_bounds() {
        let mut state = cart();
        assert!(apply(
            &mut state,
            &CartAction::QuantitySet {
                cart_item_id: CartItemId::new(1),
                quantity: 5,
                stock: 5,
            }
        ));
        assert_eq!(state.items[0].quantity, 5);
        assert_eq!(state.items[0].total_price, Rupiah::from_whole(50_000));
        assert_eq!(state.subtotal, Rupiah::from_whole(55_000));
        assert_eq!(state.total_items, 6);

        assert!(apply(
            &mut state,
            &CartAction::QuantitySet {
                cart_item_id: CartItemId::new(1),
                quantity: 1,
                stock: 5,
            }
        ));
        assert_eq!(state.subtotal, Rupiah::from_whole(15_000));
        assert_eq!(state.total_items, 2);
    }

    #[test]
    fn test_decrement_never_below_one() {
        let mut state = cart();
        let decrement = CartAction::ItemDecremented {
            cart_item_id: CartItemId::new(1),
        };
        assert!(apply(&mut state, &decrement));
        assert_eq!(state.items[0].quantity, 1);
        assert_eq!(state.subtotal, Rupiah::from_whole(15_000));

        assert!(!apply(&mut state, &decrement));
        assert_eq!(state.items[0].quantity, 1);
        assert_eq!(state.total_items, 2);
    }

    #[test]
    fn test_item_added_updates_aggregates() {
        let mut state = cart();
        let before = state.clone();
        assert!(apply(
            &mut state,
            &CartAction::ItemAdded {
                product_id: ProductId::new(20),
                quantity: 3,
                unit_price: Rupiah::from_whole(5_000),
            }
        ));
        assert_eq!(state.subtotal, before.subtotal + Rupiah::from_whole(15_000));
        assert_eq!(state.total_items, before.total_items + 3);
        assert_eq!(state.items[1].quantity, 4);
        assert_eq!(state.items[1].total_price, Rupiah::from_whole(20_000));
    }

    #[test]
    fn test_item_added_overflowing_quantity_is_noop() {
        let mut state = cart();
        let action = CartAction::ItemAdded {
            product_id: ProductId::new(10),
            quantity: u32::MAX,
            unit_price: Rupiah::from_whole(10_000),
        };
        assert!(!action.is_applicable(&state));
        assert!(!apply(&mut state, &action));
        assert_eq!(state, cart());
    }

    #[test]
    fn test_item_added_for_unlisted_product_moves_aggregates_only() {
        let mut state = cart();
        assert!(apply(
            &mut state,
            &CartAction::ItemAdded {
                product_id: ProductId::new(99),
                quantity: 1,
                unit_price: Rupiah::from_whole(7_500),
            }
        ));
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.subtotal, Rupiah::from_whole(32_500));
        assert_eq!(state.total_items, 4);
    }

    #[test]
    fn test_item_removed_subtracts_line_total() {
        let mut state = cart();
        assert!(apply(
            &mut state,
            &CartAction::ItemRemoved {
                cart_item_id: CartItemId::new(1),
            }
        ));
        assert!(state.items.iter().all(|i| i.cart_item_id != CartItemId::new(1)));
        assert_eq!(state.subtotal, Rupiah::from_whole(5_000));
        assert_eq!(state.total_items, 1);
    }

    #[test]
    fn test_unknown_line_is_noop() {
        let mut state = cart();
        assert!(!apply(
            &mut state,
            &CartAction::ItemRemoved {
                cart_item_id: CartItemId::new(42),
            }
        ));
        assert_eq!(state, cart());
    }
}
