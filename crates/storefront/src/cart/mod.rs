//! Cart state manager.
//!
//! [`Cart`] owns the line items for one shopper, keeps the derived item count
//! in step with them, and writes a [`CartSnapshot`] to a durable slot after
//! every mutation. It renders nothing: UI layers read [`Cart::badge`],
//! [`Cart::summary`] and [`Cart::total`], and subscribe to [`CartEvent`]s.
//!
//! # Count policy
//!
//! The item count is always recomputed from the items, both after a
//! mutation and when restoring. A stored count that disagrees with its items
//! is logged and discarded.
//!
//! # Failure semantics
//!
//! Every operation succeeds except [`Cart::checkout`] on an empty cart.
//! Storage failures are logged and otherwise ignored; the in-memory state is
//! never rolled back because a write failed.

pub mod badge;
pub mod events;
pub mod handoff;
pub mod storage;

use rust_decimal::Decimal;
use spacegoods_core::{AddToCart, CartItem, CartSnapshot, ProductId, item_count, saturating_sum};

pub use badge::Badge;
pub use events::{CartEvent, SubscriptionId};
pub use handoff::{
    CheckoutError, CheckoutHandoff, DEFAULT_WHATSAPP_NUMBER, HandoffLauncher, LogLauncher,
    confirmation_prompt,
};
pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};

use events::Subscribers;

/// Summary text for an empty cart.
pub const EMPTY_CART_SUMMARY: &str = "Your cart is empty";

/// A shopper's cart bound to a durable slot.
///
/// Construct one per execution context (a CLI run, an HTTP request) and pass
/// it to whatever needs it.
#[derive(Debug)]
pub struct Cart<S: CartStorage> {
    items: Vec<CartItem>,
    count: u32,
    storage: S,
    subscribers: Subscribers,
}

impl<S: CartStorage> Cart<S> {
    /// Create a cart, restoring any snapshot found in `storage`.
    pub fn new(storage: S) -> Self {
        let mut cart = Self::empty(storage);
        cart.restore();
        cart
    }

    /// Create an empty cart without reading `storage`.
    pub fn empty(storage: S) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            storage,
            subscribers: Subscribers::default(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a candidate to the cart.
    ///
    /// Units of an item already in the cart are added to its line; a new item
    /// is appended. The count is recomputed, the snapshot persisted, and
    /// subscribers receive [`CartEvent::ItemAdded`].
    pub fn add_item(&mut self, candidate: AddToCart) {
        let id = candidate.id.clone();
        let quantity = candidate.quantity.max(1);

        if let Some(existing) = self.items.iter_mut().find(|item| item.id == id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            let mut item = CartItem::from(candidate);
            item.quantity = quantity;
            self.items.push(item);
        }

        self.recount();
        self.persist();

        tracing::debug!(product_id = %id, quantity, count = self.count, "Added to cart");
        self.subscribers.notify(&CartEvent::ItemAdded {
            id,
            quantity,
            count: self.count,
        });
    }

    /// Remove the line for `id`. Does nothing if the cart has no such line.
    pub fn remove_item(&mut self, id: &ProductId) {
        let Some(index) = self.items.iter().position(|item| &item.id == id) else {
            return;
        };

        self.items.remove(index);
        self.recount();
        self.persist();

        tracing::debug!(product_id = %id, count = self.count, "Removed from cart");
        self.subscribers.notify(&CartEvent::ItemRemoved {
            id: id.clone(),
            count: self.count,
        });
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.count = 0;
        self.persist();
        self.subscribers.notify(&CartEvent::Cleared);
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current state as a persistable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            count: self.count,
        }
    }

    /// One `<name> (x<qty>) - $<line total>` line per item, or
    /// [`EMPTY_CART_SUMMARY`].
    #[must_use]
    pub fn summary(&self) -> String {
        if self.items.is_empty() {
            return EMPTY_CART_SUMMARY.to_owned();
        }

        self.items
            .iter()
            .map(CartItem::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Sum of `price * quantity` over all items, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        saturating_sum(self.items.iter().map(CartItem::line_total))
    }

    #[must_use]
    pub fn badge(&self) -> Badge {
        Badge::from_count(self.count)
    }

    /// Text to show before handing off, or `None` for an empty cart.
    #[must_use]
    pub fn confirmation_prompt(&self) -> Option<String> {
        (!self.is_empty()).then(|| confirmation_prompt(&self.summary(), self.total()))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Compose the order message addressed to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to order.
    pub fn checkout_handoff(&self, destination: &str) -> Result<CheckoutHandoff, CheckoutError> {
        if self.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(CheckoutHandoff::compose(
            destination,
            &self.summary(),
            self.total(),
        ))
    }

    /// Compose the order message and pass it to `launcher`.
    ///
    /// The cart is not cleared and delivery is not confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to order; the
    /// launcher is not called in that case.
    pub fn checkout(
        &self,
        destination: &str,
        launcher: &dyn HandoffLauncher,
    ) -> Result<CheckoutHandoff, CheckoutError> {
        let handoff = self.checkout_handoff(destination)?;
        launcher.launch(&handoff);
        Ok(handoff)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a listener for cart changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartEvent) + Send + 'static,
    {
        self.subscribers.subscribe(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the current snapshot to the slot. Failures are logged only.
    pub fn persist(&mut self) {
        let json = match serde_json::to_string(&self.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.save(CART_STORAGE_KEY, &json) {
            tracing::error!(error = %e, "Failed to save cart");
        }
    }

    /// Replace the cart contents with the snapshot in the slot.
    ///
    /// A missing slot leaves the cart empty. An unreadable or unparseable slot
    /// empties the cart. Zero-quantity lines are dropped and lines sharing an
    /// id are folded into the first one. The count is recomputed from the
    /// restored items.
    pub fn restore(&mut self) {
        let raw = match self.storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load cart");
                self.reset();
                return;
            }
        };

        match serde_json::from_str::<CartSnapshot>(&raw) {
            Ok(snapshot) => {
                if !snapshot.is_consistent() {
                    tracing::warn!(
                        stored = snapshot.count,
                        actual = item_count(&snapshot.items),
                        "Stored cart count disagrees with its items; recomputing"
                    );
                }
                let (items, repaired) = repair_items(snapshot.items);
                if repaired {
                    tracing::warn!(
                        lines = items.len(),
                        "Stored cart had empty or duplicate lines; repaired"
                    );
                }
                self.items = items;
                self.recount();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse stored cart");
                self.reset();
            }
        }
    }

    /// Borrow the backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give up the cart and return its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn recount(&mut self) {
        self.count = item_count(&self.items);
    }

    fn reset(&mut self) {
        self.items.clear();
        self.count = 0;
    }
}

/// Drop zero-quantity lines and fold duplicate ids into their first line.
///
/// Returns the repaired items and whether anything changed.
fn repair_items(items: Vec<CartItem>) -> (Vec<CartItem>, bool) {
    let mut repaired: Vec<CartItem> = Vec::with_capacity(items.len());
    let mut changed = false;

    for item in items {
        if item.quantity == 0 {
            changed = true;
        } else if let Some(first) = repaired.iter_mut().find(|line| line.id == item.id) {
            first.quantity = first.quantity.saturating_add(item.quantity);
            changed = true;
        } else {
            repaired.push(item);
        }
    }

    (repaired, changed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};

    use spacegoods_core::{MAX_PRICE, Price};

    use super::*;

    fn candidate(id: &str, price: Decimal, quantity: u32) -> AddToCart {
        AddToCart::new(id, id.to_uppercase(), Price::coerce(price)).with_quantity(quantity)
    }

    fn cart() -> Cart<MemoryStorage> {
        Cart::new(MemoryStorage::new())
    }

    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<CheckoutHandoff>>,
    }

    impl HandoffLauncher for RecordingLauncher {
        fn launch(&self, handoff: &CheckoutHandoff) {
            self.launched.borrow_mut().push(handoff.clone());
        }
    }

    // =========================================================================
    // Add / remove / clear
    // =========================================================================

    #[test]
    fn test_distinct_adds_sum_quantities() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 2));
        cart.add_item(candidate("b", Decimal::ONE, 1));
        cart.add_item(AddToCart::new("c", "C", Price::ZERO));

        assert_eq!(cart.items().len(), 3);
        assert_eq!(cart.count(), 4);
    }

    #[test]
    fn test_same_id_merges() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 2));
        cart.add_item(candidate("a", Decimal::ONE, 3));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_merge_keeps_first_name_and_price() {
        let mut cart = cart();
        cart.add_item(AddToCart::new("a", "First", Price::from_cents(100)));
        cart.add_item(AddToCart::new("a", "Second", Price::from_cents(999)));

        assert_eq!(cart.items()[0].name, "First");
        assert_eq!(cart.items()[0].price, Price::from_cents(100));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = cart();
        for id in ["c", "a", "b"] {
            cart.add_item(candidate(id, Decimal::ONE, 1));
        }
        cart.add_item(candidate("a", Decimal::ONE, 1));

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove_present_item() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 2));
        cart.add_item(candidate("b", Decimal::ONE, 3));

        cart.remove_item(&ProductId::new("b"));
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id.as_str(), "a");
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 2));
        let before = cart.snapshot();

        cart.remove_item(&ProductId::new("zzz"));
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn test_clear() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 7));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);

        // Clearing an empty cart is fine too.
        cart.clear();
        assert_eq!(cart.count(), 0);
    }

    // =========================================================================
    // Summary / total / badge
    // =========================================================================

    #[test]
    fn test_total() {
        let mut cart = cart();
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.add_item(candidate("a", Decimal::from(10), 2));
        cart.add_item(candidate("b", Decimal::from(5), 1));
        assert_eq!(cart.total(), Decimal::from(25));
    }

    #[test]
    fn test_huge_price_and_quantity_do_not_panic() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::MAX, u32::MAX));

        assert_eq!(cart.items()[0].price.amount(), MAX_PRICE);
        assert_eq!(cart.total(), MAX_PRICE * Decimal::from(u32::MAX));
        assert!(cart.summary().starts_with("A (x4294967295) - $"));
    }

    #[test]
    fn test_restore_with_oversized_stored_price_does_not_panic() {
        let storage = MemoryStorage::new().with_entry(
            CART_STORAGE_KEY,
            r#"{"items":[{"id":"a","name":"A","price":"79228162514264337593543950335","quantity":2}],"count":2}"#,
        );
        let cart = Cart::new(storage);

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.summary(), EMPTY_CART_SUMMARY);
    }

    #[test]
    fn test_count_saturates_at_max_lines() {
        let mut cart = cart();
        cart.add_item(candidate("a", MAX_PRICE, u32::MAX));
        cart.add_item(candidate("b", MAX_PRICE, u32::MAX));

        assert_eq!(cart.count(), u32::MAX);
        assert_eq!(
            cart.total(),
            MAX_PRICE * Decimal::from(u32::MAX) * Decimal::TWO
        );
    }

    #[test]
    fn test_summary() {
        let mut cart = cart();
        assert_eq!(cart.summary(), EMPTY_CART_SUMMARY);

        cart.add_item(
            AddToCart::new("moon-rock", "Moon Rock", Price::coerce(Decimal::new(95, 1)))
                .with_quantity(3),
        );
        assert_eq!(cart.summary(), "Moon Rock (x3) - $28.50");

        cart.add_item(AddToCart::new("dust", "Star Dust", Price::from_cents(125)));
        assert_eq!(
            cart.summary(),
            "Moon Rock (x3) - $28.50\nStar Dust (x1) - $1.25"
        );
    }

    #[test]
    fn test_badge_tracks_count() {
        let mut cart = cart();
        assert!(!cart.badge().visible);

        cart.add_item(candidate("a", Decimal::ONE, 120));
        assert_eq!(cart.badge().label, "99+");
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[test]
    fn test_round_trip_through_storage() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::new(95, 1), 3));
        cart.add_item(candidate("b", Decimal::from(4), 1));
        let items = cart.items().to_vec();

        let restored = Cart::new(cart.into_storage());
        assert_eq!(restored.items(), items.as_slice());
        assert_eq!(restored.count(), 4);
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 1));
        let stored: CartSnapshot =
            serde_json::from_str(cart.storage().get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.count, 1);

        cart.clear();
        let stored: CartSnapshot =
            serde_json::from_str(cart.storage().get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert!(stored.items.is_empty());
        assert_eq!(stored.count, 0);
    }

    #[test]
    fn test_restore_recomputes_drifted_count() {
        let storage = MemoryStorage::new().with_entry(
            CART_STORAGE_KEY,
            r#"{"items":[{"id":"a","name":"A","price":"2","quantity":3}],"count":99}"#,
        );
        let cart = Cart::new(storage);

        assert_eq!(cart.count(), 3);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_restore_drops_empty_lines_and_merges_duplicates() {
        let storage = MemoryStorage::new().with_entry(
            CART_STORAGE_KEY,
            r#"{"items":[
                {"id":"a","name":"A","price":"2","quantity":1},
                {"id":"z","name":"Z","price":"9","quantity":0},
                {"id":"b","name":"B","price":"1","quantity":1},
                {"id":"a","name":"A again","price":"5","quantity":2}
            ],"count":4}"#,
        );
        let mut cart = Cart::new(storage);

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[0].name, "A");
        assert_eq!(cart.count(), 4);
        assert!(!cart.summary().contains("(x0)"));

        cart.add_item(candidate("a", Decimal::ONE, 1));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn test_restore_garbage_leaves_cart_empty() {
        let storage = MemoryStorage::new().with_entry(CART_STORAGE_KEY, "{not json");
        let cart = Cart::new(storage);
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_restore_replaces_existing_items() {
        let mut cart = cart();
        cart.add_item(candidate("a", Decimal::ONE, 1));
        // Another context overwrites the slot; restoring picks up its snapshot.
        let mut storage = cart.into_storage();
        storage
            .save(
                CART_STORAGE_KEY,
                r#"{"items":[{"id":"b","name":"B","price":"1","quantity":2}],"count":2}"#,
            )
            .unwrap();

        let mut cart = Cart::empty(storage);
        cart.add_item(candidate("c", Decimal::ONE, 1));
        cart.restore();
        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_unavailable_storage_still_mutates() {
        let mut cart = Cart::new(MemoryStorage::unavailable());
        cart.add_item(candidate("a", Decimal::ONE, 2));
        assert_eq!(cart.count(), 2);

        cart.remove_item(&ProductId::new("a"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quota_exceeded_keeps_in_memory_state() {
        let mut cart = Cart::new(MemoryStorage::with_quota(16));
        cart.add_item(candidate("a", Decimal::ONE, 2));

        assert_eq!(cart.count(), 2);
        assert!(cart.storage().get(CART_STORAGE_KEY).is_none());
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    #[test]
    fn test_checkout_empty_cart_signals() {
        let cart = cart();
        let launcher = RecordingLauncher::default();

        assert_eq!(
            cart.checkout(DEFAULT_WHATSAPP_NUMBER, &launcher),
            Err(CheckoutError::EmptyCart)
        );
        assert!(launcher.launched.borrow().is_empty());
        assert!(cart.confirmation_prompt().is_none());
    }

    #[test]
    fn test_checkout_hands_off_without_clearing() {
        let mut cart = cart();
        cart.add_item(
            AddToCart::new("moon-rock", "Moon Rock", Price::coerce(Decimal::new(95, 1)))
                .with_quantity(3),
        );
        let launcher = RecordingLauncher::default();

        let handoff = cart.checkout("15550001111", &launcher).unwrap();
        assert_eq!(handoff.destination, "15550001111");
        assert!(handoff.message.contains("Moon Rock (x3) - $28.50"));
        assert!(handoff.message.contains("*Total: $28.50*"));
        assert_eq!(launcher.launched.borrow().as_slice(), &[handoff]);

        assert_eq!(cart.count(), 3);
        assert!(cart.confirmation_prompt().unwrap().contains("Total: $28.50"));
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    #[test]
    fn test_subscribers_see_changes() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut cart = cart();
        let sink = Arc::clone(&events);
        let id = cart.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        cart.add_item(candidate("a", Decimal::ONE, 2));
        cart.add_item(candidate("a", Decimal::ONE, 1));
        cart.remove_item(&ProductId::new("missing"));
        cart.remove_item(&ProductId::new("a"));
        cart.clear();

        assert!(cart.unsubscribe(id));
        cart.add_item(candidate("b", Decimal::ONE, 1));

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                CartEvent::ItemAdded {
                    id: ProductId::new("a"),
                    quantity: 2,
                    count: 2
                },
                CartEvent::ItemAdded {
                    id: ProductId::new("a"),
                    quantity: 1,
                    count: 3
                },
                CartEvent::ItemRemoved {
                    id: ProductId::new("a"),
                    count: 0
                },
                CartEvent::Cleared,
            ]
        );
    }
}
