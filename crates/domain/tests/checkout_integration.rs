//! Integration tests for the cart, pricing and checkout flow.
//!
//! These tests drive the public API the way a storefront UI would: build a
//! cart, price it, walk the checkout stages and place the order.

use catalog::{CategoryId, Product, ProductId, SubcategoryId};
use chrono::Utc;
use common::Money;
use domain::{
    Cart, CartService, CheckoutError, CheckoutSession, CheckoutStage, ClientStorageExt,
    CreditCheckStatus, CreditDecision, DeliveryAddress, DeliveryType, FileStorage,
    InMemoryCreditCheck, InMemoryStorage, OrderStatus, PaymentMethod, PricingEngine, Storefront,
    CART_KEY,
};

fn product(id: i64, reais: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Produto {id}"),
        price: Money::from_reais(reais),
        description: None,
        image: String::new(),
        category_id: CategoryId::new(1),
        category: "Masculino".to_string(),
        subcategory_id: SubcategoryId::new(1),
        subcategory: "Camisetas".to_string(),
        available_sizes: Vec::new(),
        created_at: Utc::now(),
    }
}

fn address(delivery_type: DeliveryType) -> DeliveryAddress {
    DeliveryAddress {
        full_name: "João da Silva".to_string(),
        phone: "(21) 99999-0000".to_string(),
        street: "Avenida Brasil".to_string(),
        number: "1000".to_string(),
        complement: Some("Apto 12".to_string()),
        neighborhood: "Centro".to_string(),
        zip_code: "20000-000".to_string(),
        delivery_type,
    }
}

/// A(50.00 × 2) + B(30.00 × 1)
fn sample_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_item(&product(1, 50), 2, None, None).unwrap();
    cart.add_item(&product(2, 30), 1, None, None).unwrap();
    cart
}

mod cart_properties {
    use super::*;

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        let shirt = product(1, 50);
        cart.add_item(&shirt, 1, None, None).unwrap();
        cart.add_item(&shirt, 2, None, None).unwrap();
        cart.add_item(&shirt, 4, None, None).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 7);
    }

    #[test]
    fn remove_then_add_starts_fresh() {
        let mut cart = Cart::new();
        let shirt = product(1, 50);
        cart.add_item(&shirt, 3, None, None).unwrap();
        assert!(cart.remove_item(shirt.id, None, None));
        cart.add_item(&shirt, 1, None, None).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        assert_eq!(Cart::new().subtotal(), Money::zero());
        assert_eq!(sample_cart().subtotal(), Money::from_reais(130));
    }

    #[test]
    fn clearing_twice_is_harmless() {
        let mut cart = sample_cart();
        assert!(cart.clear());
        assert!(!cart.clear());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn cart_survives_restart_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let mut service = CartService::new(FileStorage::new(dir.path()));
        service
            .add_item(&product(1, 50), 2, None, None)
            .await
            .unwrap();
        drop(service);

        let restored = CartService::restore(FileStorage::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(restored.subtotal(), Money::from_reais(100));
    }
}

mod pricing_properties {
    use super::*;

    #[test]
    fn free_shipping_above_threshold() {
        let engine = PricingEngine::default();
        let subtotal = Money::from_reais(250);
        assert_eq!(
            engine.shipping_fee(subtotal, Some(DeliveryType::InCity)),
            Money::zero()
        );
        assert_eq!(
            engine.shipping_fee(subtotal, Some(DeliveryType::OutOfCity)),
            Money::zero()
        );
    }

    #[test]
    fn out_of_city_fee() {
        let engine = PricingEngine::default();
        assert_eq!(
            engine.shipping_fee(Money::from_reais(100), Some(DeliveryType::OutOfCity)),
            Money::from_reais(30)
        );
    }

    #[test]
    fn pix_discount() {
        let engine = PricingEngine::default();
        assert_eq!(
            engine.discount(Money::from_reais(100), Some(PaymentMethod::Pix)),
            Money::from_reais(10)
        );
    }
}

mod checkout_flow {
    use super::*;

    #[test]
    fn empty_cart_never_reaches_payment() {
        let result = CheckoutSession::begin(&Cart::new());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn cash_in_city_worked_example() {
        let mut session = CheckoutSession::begin(&sample_cart()).unwrap();
        session.submit_address(address(DeliveryType::InCity)).unwrap();
        session.select_payment(PaymentMethod::Cash).unwrap();

        let quote = session.pricing();
        assert_eq!(quote.subtotal, Money::from_reais(130));
        assert_eq!(quote.shipping_fee, Money::from_reais(15));
        assert_eq!(quote.discount, Money::from_reais(13));
        assert_eq!(quote.total, Money::from_reais(132));
    }

    #[test]
    fn credit_in_city_worked_example() {
        let mut session = CheckoutSession::begin(&sample_cart()).unwrap();
        session.submit_address(address(DeliveryType::InCity)).unwrap();
        session.select_payment(PaymentMethod::Credit).unwrap();

        let quote = session.pricing();
        assert_eq!(quote.discount, Money::zero());
        assert_eq!(quote.total, Money::from_reais(145));
    }

    #[test]
    fn later_cart_edits_do_not_change_the_session() {
        let mut cart = sample_cart();
        let session = CheckoutSession::begin(&cart).unwrap();
        cart.add_item(&product(3, 500), 1, None, None).unwrap();

        assert_eq!(session.lines().len(), 2);
        assert_eq!(session.pricing().subtotal, Money::from_reais(130));
    }

    #[tokio::test]
    async fn full_storefront_checkout() {
        let storage = InMemoryStorage::new();
        let credit = InMemoryCreditCheck::with_decision(CreditDecision::Rejected);
        let mut storefront = Storefront::restore(storage.clone(), credit).await.unwrap();

        let shirt = product(1, 50);
        let pants = product(2, 30);
        storefront
            .cart_mut()
            .add_item(&shirt, 2, None, None)
            .await
            .unwrap();
        storefront
            .cart_mut()
            .add_item(&pants, 1, None, None)
            .await
            .unwrap();
        assert_eq!(storefront.cart_summary().shipping_fee, Money::from_reais(20));

        let mut session = storefront.begin_checkout().unwrap();
        assert_eq!(session.stage(), CheckoutStage::Address);

        let mut incomplete = address(DeliveryType::OutOfCity);
        incomplete.zip_code = String::new();
        assert!(session.submit_address(incomplete).is_err());
        assert_eq!(session.stage(), CheckoutStage::Address);

        session.submit_address(address(DeliveryType::OutOfCity)).unwrap();
        session.select_payment(PaymentMethod::Credit).unwrap();
        let status = storefront.run_credit_check(&mut session).await.unwrap();
        assert_eq!(status, CreditCheckStatus::Rejected);

        let confirmation = storefront.place_order(&mut session).await.unwrap();
        assert_eq!(confirmation.status, OrderStatus::AguardandoConfirmacao);
        assert_eq!(confirmation.status.label(), "Aguardando confirmação");
        assert!(confirmation.credit_rejected());
        assert_eq!(confirmation.pricing.total, Money::from_reais(160));

        let number = confirmation.order_number.to_string();
        assert_eq!(number.len(), 10);
        assert!(number.starts_with("ORD-"));

        assert_eq!(session.stage(), CheckoutStage::Submitted);
        assert!(storefront.cart().is_empty());
        let stored: Vec<domain::CartLine> = storage.load_json(CART_KEY).await.unwrap().unwrap();
        assert!(stored.is_empty());

        let again = session.select_payment(PaymentMethod::Pix);
        assert!(matches!(
            again,
            Err(CheckoutError::InvalidStageTransition { .. })
        ));
    }
}
