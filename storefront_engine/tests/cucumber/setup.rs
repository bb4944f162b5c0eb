use std::str::FromStr;

use cucumber::given;
use storefront_engine::db_types::{Cents, Customer, NewProduct};

use crate::cucumber::{world::StoreSystem, StoreWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut StoreWorld) {
    let system = StoreSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a product {string} priced at {word} with {int} in stock")]
async fn a_product(world: &mut StoreWorld, name: String, price: String, stock: i64) {
    let price = Cents::from_str(&price).expect("Invalid price");
    let system = world.system_mut();
    let product =
        system.catalog.create_product(NewProduct::new(name.as_str(), price, stock)).await.expect("Error creating product");
    system.products.insert(name, product.id);
}

#[given(expr = "a customer {string}")]
async fn a_customer(world: &mut StoreWorld, name: String) {
    let system = world.system_mut();
    let id = system.customers.len() as i64 + 1;
    let customer = Customer::new(id, name.as_str(), format!("{name}@example.com"));
    system.customers.insert(name, customer);
}
