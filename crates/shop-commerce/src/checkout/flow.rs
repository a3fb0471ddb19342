//! Checkout selection state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cart::{
    apply_discount, compute_subtotal, CartStore, CheckoutTotals, DiscountOutcome,
    DiscountResolver, LineIdentity, LineItem,
};
use crate::ids::BatchId;
use crate::CommerceError;

/// Where the flow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutState {
    /// No batch in flight.
    Idle,
    /// A batch has been handed to the payment screen.
    BatchPrepared,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::BatchPrepared => "batch_prepared",
        }
    }
}

/// Payment options offered on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CashOnDelivery,
        PaymentMethod::CreditCard,
        PaymentMethod::PayPal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::PayPal => "paypal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on delivery",
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::PayPal => "PayPal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cod" | "cash" | "cash-on-delivery" => Ok(PaymentMethod::CashOnDelivery),
            "card" | "credit-card" | "creditcard" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::PayPal),
            other => Err(format!(
                "unknown payment method '{}' (expected one of: cod, credit-card, paypal)",
                other
            )),
        }
    }
}

/// The items handed to one checkout pass. Consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutBatch {
    pub id: BatchId,
    /// Entries as they were when the batch was prepared.
    pub items: Vec<LineItem>,
    /// Whether the batch was the whole cart rather than the selection.
    pub whole_cart: bool,
    /// Current totals, discounted only if the code was accepted.
    pub totals: CheckoutTotals,
    /// Result of the last code applied, if any.
    pub discount: Option<DiscountOutcome>,
    pub payment: Option<PaymentMethod>,
}

impl CheckoutBatch {
    /// Identities of the batched entries.
    pub fn identities(&self) -> Vec<LineIdentity> {
        self.items.iter().map(LineItem::identity).collect()
    }

    /// The accepted discount code, if any.
    pub fn applied_code(&self) -> Option<&str> {
        match &self.discount {
            Some(DiscountOutcome::Applied { code, .. }) => Some(code),
            _ => None,
        }
    }

    /// Check if the last code applied was rejected.
    pub fn code_rejected(&self) -> bool {
        matches!(self.discount, Some(DiscountOutcome::Rejected { .. }))
    }

    /// Total units in the batch.
    pub fn quantity_total(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn reprice(
        &mut self,
        code: Option<&str>,
        resolver: &dyn DiscountResolver,
    ) -> Result<(), CommerceError> {
        let subtotal = self.totals.subtotal;
        match code {
            Some(code) => {
                let outcome = apply_discount(subtotal, code, resolver)?;
                self.totals = outcome.totals();
                self.discount = Some(outcome);
            }
            None => {
                self.totals = CheckoutTotals::undiscounted(subtotal);
                self.discount = None;
            }
        }
        Ok(())
    }
}

/// Single-flight checkout.
///
/// At most one [`CheckoutBatch`] is outstanding. It leaves the flow through
/// [`CheckoutFlow::confirm`] or [`CheckoutFlow::abandon`].
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    batch: Option<CheckoutBatch>,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CheckoutState {
        match self.batch {
            Some(_) => CheckoutState::BatchPrepared,
            None => CheckoutState::Idle,
        }
    }

    /// The batch in flight.
    pub fn batch(&self) -> Option<&CheckoutBatch> {
        self.batch.as_ref()
    }

    /// Snapshot the selected entries into a new batch.
    ///
    /// An unknown `code` does not stop the batch; it is priced without a
    /// discount and [`CheckoutBatch::code_rejected`] reports it.
    pub fn prepare(
        &mut self,
        cart: &CartStore,
        code: Option<&str>,
        resolver: &dyn DiscountResolver,
    ) -> Result<&CheckoutBatch, CommerceError> {
        let items: Vec<LineItem> = cart.selected_items().cloned().collect();
        self.start(cart, items, false, code, resolver)
    }

    /// Snapshot every entry, selected or not, into a new batch.
    pub fn prepare_whole_cart(
        &mut self,
        cart: &CartStore,
        code: Option<&str>,
        resolver: &dyn DiscountResolver,
    ) -> Result<&CheckoutBatch, CommerceError> {
        self.start(cart, cart.items().to_vec(), true, code, resolver)
    }

    /// Re-price the batch in flight with `code`.
    ///
    /// A rejected code leaves the batch priced without any discount and
    /// returns [`CommerceError::InvalidDiscountCode`].
    pub fn apply_code(
        &mut self,
        code: &str,
        resolver: &dyn DiscountResolver,
    ) -> Result<CheckoutTotals, CommerceError> {
        let batch = self.batch.as_mut().ok_or(CommerceError::NoBatchInFlight)?;
        batch.reprice(Some(code), resolver)?;
        tracing::info!(batch_id = %batch.id, code, accepted = !batch.code_rejected(), "discount code applied");
        match &batch.discount {
            Some(outcome) => outcome.clone().into_result(),
            None => Ok(batch.totals),
        }
    }

    /// Record how the shopper will pay.
    pub fn choose_payment(&mut self, method: PaymentMethod) -> Result<(), CommerceError> {
        let batch = self.batch.as_mut().ok_or(CommerceError::NoBatchInFlight)?;
        batch.payment = Some(method);
        tracing::info!(batch_id = %batch.id, payment = method.as_str(), "payment method chosen");
        Ok(())
    }

    /// Complete the batch after payment.
    ///
    /// Removes the purchased entries from `cart`, or empties it when the batch
    /// covered the whole cart, and returns the consumed batch. On error the
    /// batch stays in flight.
    pub async fn confirm(
        &mut self,
        batch_id: &BatchId,
        cart: &mut CartStore,
    ) -> Result<CheckoutBatch, CommerceError> {
        let batch = self.in_flight(batch_id)?;
        if batch.payment.is_none() {
            return Err(CommerceError::PaymentMethodRequired);
        }
        let batch = self.batch.take().ok_or(CommerceError::NoBatchInFlight)?;

        cart.reconcile_after_checkout(&batch.identities()).await;
        if batch.whole_cart {
            cart.clear().await;
        }

        tracing::info!(
            batch_id = %batch.id,
            entries = batch.items.len(),
            total = batch.totals.final_total.amount_minor,
            "checkout confirmed"
        );
        Ok(batch)
    }

    /// Drop the batch without touching the cart.
    pub fn abandon(&mut self, batch_id: &BatchId) -> Result<CheckoutBatch, CommerceError> {
        self.in_flight(batch_id)?;
        let batch = self.batch.take().ok_or(CommerceError::NoBatchInFlight)?;
        tracing::info!(batch_id = %batch.id, "checkout abandoned");
        Ok(batch)
    }

    fn in_flight(&self, batch_id: &BatchId) -> Result<&CheckoutBatch, CommerceError> {
        let batch = self.batch.as_ref().ok_or(CommerceError::NoBatchInFlight)?;
        if &batch.id != batch_id {
            return Err(CommerceError::BatchMismatch {
                expected: batch.id.clone(),
                got: batch_id.clone(),
            });
        }
        Ok(batch)
    }

    fn start(
        &mut self,
        cart: &CartStore,
        items: Vec<LineItem>,
        whole_cart: bool,
        code: Option<&str>,
        resolver: &dyn DiscountResolver,
    ) -> Result<&CheckoutBatch, CommerceError> {
        if let Some(outstanding) = &self.batch {
            return Err(CommerceError::BatchAlreadyInFlight(outstanding.id.clone()));
        }
        if items.is_empty() {
            return Err(CommerceError::NothingSelected);
        }

        let subtotal = compute_subtotal(&items, cart.currency())?;
        let mut batch = CheckoutBatch {
            id: BatchId::generate(),
            items,
            whole_cart,
            totals: CheckoutTotals::undiscounted(subtotal),
            discount: None,
            payment: None,
        };
        batch.reprice(code, resolver)?;

        tracing::info!(
            batch_id = %batch.id,
            entries = batch.items.len(),
            whole_cart,
            total = batch.totals.final_total.amount_minor,
            "checkout batch prepared"
        );
        let batch: &CheckoutBatch = self.batch.insert(batch);
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shop_cache::{Cache, MemoryStore};

    use super::*;
    use crate::cart::DiscountTable;
    use crate::catalog::CatalogItem;
    use crate::ids::CatalogId;
    use crate::money::{Currency, Money};

    fn shirt() -> CatalogItem {
        CatalogItem::new("shirt", "Linen Shirt", Money::new(150000, Currency::VND))
            .with_variants(["S", "M"])
    }

    fn tote() -> CatalogItem {
        CatalogItem::new("tote", "Canvas Tote", Money::new(90000, Currency::VND))
    }

    async fn cart_with_selection() -> CartStore {
        let mut cart = CartStore::load(Cache::new(Arc::new(MemoryStore::new())), Currency::VND).await;
        cart.add(&shirt(), Some("S")).await.unwrap();
        cart.add(&tote(), None).await.unwrap();
        cart.toggle_select(&CatalogId::new("tote"), None).await;
        cart
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert_eq!("paypal".parse::<PaymentMethod>().unwrap(), PaymentMethod::PayPal);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[tokio::test]
    async fn test_prepare_selected_only() {
        let cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let batch = flow.prepare(&cart, Some("NAT"), &DiscountTable::default()).unwrap();

        assert_eq!(batch.identities(), vec![LineIdentity::new("tote", None)]);
        assert_eq!(batch.totals.subtotal.amount_minor, 90000);
        assert_eq!(batch.totals.final_total.amount_minor, 70000);
        assert_eq!(batch.applied_code(), Some("NAT"));
        assert_eq!(flow.state(), CheckoutState::BatchPrepared);
    }

    #[tokio::test]
    async fn test_prepare_requires_selection() {
        let mut cart = cart_with_selection().await;
        cart.toggle_select(&CatalogId::new("tote"), None).await;
        let mut flow = CheckoutFlow::new();

        assert!(matches!(
            flow.prepare(&cart, None, &DiscountTable::default()),
            Err(CommerceError::NothingSelected)
        ));
        assert_eq!(flow.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_single_flight() {
        let cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let id = flow.prepare(&cart, None, &DiscountTable::default()).unwrap().id.clone();

        match flow.prepare_whole_cart(&cart, None, &DiscountTable::default()) {
            Err(CommerceError::BatchAlreadyInFlight(outstanding)) => assert_eq!(outstanding, id),
            other => panic!("expected BatchAlreadyInFlight, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_code_prices_without_discount() {
        let cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let resolver = DiscountTable::default();
        let batch = flow.prepare(&cart, Some("BOGUS"), &resolver).unwrap();
        assert!(batch.code_rejected());
        assert_eq!(batch.totals.final_total, batch.totals.subtotal);

        flow.apply_code("NAT", &resolver).unwrap();
        assert_eq!(flow.batch().unwrap().totals.final_total.amount_minor, 70000);

        assert!(matches!(
            flow.apply_code("nat", &resolver),
            Err(CommerceError::InvalidDiscountCode(_))
        ));
        let totals = flow.batch().unwrap().totals;
        assert!(!totals.has_discount());
        assert_eq!(totals.final_total.amount_minor, 90000);
    }

    #[tokio::test]
    async fn test_confirm_reconciles_selection() {
        let mut cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let id = flow.prepare(&cart, None, &DiscountTable::default()).unwrap().id.clone();

        assert!(matches!(
            flow.confirm(&id, &mut cart).await,
            Err(CommerceError::PaymentMethodRequired)
        ));
        assert_eq!(flow.state(), CheckoutState::BatchPrepared);

        flow.choose_payment(PaymentMethod::CreditCard).unwrap();
        let batch = flow.confirm(&id, &mut cart).await.unwrap();

        assert_eq!(batch.payment, Some(PaymentMethod::CreditCard));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].identity(), LineIdentity::new("shirt", Some("S")));
        assert_eq!(flow.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_confirm_whole_cart_clears() {
        let mut cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let id = flow
            .prepare_whole_cart(&cart, None, &DiscountTable::default())
            .unwrap()
            .id
            .clone();
        flow.choose_payment(PaymentMethod::CashOnDelivery).unwrap();

        flow.confirm(&id, &mut cart).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_abandon_leaves_cart() {
        let mut cart = cart_with_selection().await;
        let mut flow = CheckoutFlow::new();
        let id = flow.prepare(&cart, None, &DiscountTable::default()).unwrap().id.clone();

        assert!(matches!(
            flow.abandon(&BatchId::new("batch_other")),
            Err(CommerceError::BatchMismatch { .. })
        ));
        flow.abandon(&id).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(matches!(
            flow.confirm(&id, &mut cart).await,
            Err(CommerceError::NoBatchInFlight)
        ));
    }
}
