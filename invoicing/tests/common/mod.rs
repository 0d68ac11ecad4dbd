#![allow(dead_code)]

use invoicing::domain::model::User;
use invoicing::domain::money::Money;
use invoicing::infra::repository::memory::MemoryStore;

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (id, first_name, last_name, balance) in [(1, "John", "Doe", 1000), (2, "Jane", "Smith", 2000)] {
        store
            .insert_user(User {
                id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                balance: Money::from_minor(balance),
            })
            .await;
    }
    store
}
