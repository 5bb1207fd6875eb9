use catalog::{CatalogStoreExt, InMemoryCatalogStore, Product};
use common::Money;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Cart, CartService, CheckoutSession, DeliveryType, InMemoryStorage, PaymentMethod,
    PricingEngine,
};

fn seeded_products(rt: &tokio::runtime::Runtime) -> Vec<Product> {
    rt.block_on(async { InMemoryCatalogStore::seeded().all_products().await.unwrap() })
}

fn cart_with_lines(products: &[Product], lines: usize) -> Cart {
    let mut cart = Cart::new();
    for (i, product) in products.iter().cycle().take(lines).enumerate() {
        let size = product.available_sizes.get(i % product.available_sizes.len().max(1));
        let color = format!("cor-{i}");
        cart.add_item(product, 1, size.map(String::as_str), Some(&color))
            .unwrap();
    }
    cart
}

fn bench_quote(c: &mut Criterion) {
    let engine = PricingEngine::default();
    let subtotal = Money::from_cents(13_000);

    c.bench_function("pricing/quote", |b| {
        b.iter(|| {
            engine.quote(
                subtotal,
                Some(DeliveryType::InCity),
                Some(PaymentMethod::Cash),
            )
        });
    });
}

fn bench_cart_subtotal(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = seeded_products(&rt);
    let cart = cart_with_lines(&products, 100);
    let engine = PricingEngine::default();

    c.bench_function("pricing/quote_cart_100_lines", |b| {
        b.iter(|| engine.quote_cart(&cart, Some(DeliveryType::OutOfCity), Some(PaymentMethod::Pix)));
    });
}

fn bench_add_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = seeded_products(&rt);

    c.bench_function("cart/add_item_persisted", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut service = CartService::new(InMemoryStorage::new());
                for product in &products {
                    let size = product.available_sizes.first().map(String::as_str);
                    service.add_item(product, 2, size, None).await.unwrap();
                }
            });
        });
    });
}

fn bench_checkout_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = seeded_products(&rt);
    let cart = cart_with_lines(&products, 10);

    c.bench_function("checkout/begin_and_quote", |b| {
        b.iter(|| {
            let session = CheckoutSession::begin(&cart).unwrap();
            session.pricing()
        });
    });
}

criterion_group!(
    benches,
    bench_quote,
    bench_cart_subtotal,
    bench_add_item,
    bench_checkout_cycle,
);
criterion_main!(benches);
