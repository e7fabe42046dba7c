//! In-process store used by the router tests and the in-process end-to-end tests.
//!
//! Mirrors the `PostgreSQL` constraints the handlers rely on: unique email,
//! order items referencing existing products, stock never going negative,
//! and order lines keeping their price after the product is deleted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use golazo_core::{
    Category, CreateOrderRequest, Email, Order, OrderId, OrderLine, OrderStatus, OrderWithItems,
    Product, ProductId, ProductInput, User, UserId,
};

use super::{NewUser, OrderStore, ProductStore, RepositoryError, Store, UserStore};

struct StoredItem {
    order_id: OrderId,
    product_id: Option<ProductId>,
    quantity: i32,
    price: Decimal,
}

#[derive(Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, (User, String)>,
    orders: BTreeMap<OrderId, Order>,
    items: Vec<StoredItem>,
    next_product: i32,
    next_user: i32,
    next_order: i32,
}

impl Tables {
    fn lines_of(&self, order_id: OrderId) -> Vec<OrderLine> {
        self.items
            .iter()
            .filter(|item| item.order_id == order_id)
            .map(|item| {
                let product = item.product_id.and_then(|id| self.products.get(&id));
                OrderLine {
                    product_id: item.product_id,
                    name: product.map(|p| p.name.clone()),
                    quantity: item.quantity,
                    price: item.price,
                    image_url: product.and_then(|p| p.image_url.clone()),
                }
            })
            .collect()
    }

    fn with_items(&self, order: &Order) -> OrderWithItems {
        OrderWithItems {
            order: order.clone(),
            items: self.lines_of(order.id),
        }
    }
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Store that keeps every table in memory behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product directly, bypassing validation.
    pub async fn insert_product(&self, input: ProductInput) -> Product {
        let mut tables = self.tables.lock().await;
        let id = ProductId::new(next_id(&mut tables.next_product));
        let now = Utc::now();
        let product = Product {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category: input.category,
            team: input.team,
            image_url: input.image_url,
            featured: input.featured,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(id, product.clone());
        product
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        Ok(self.insert_product(input.clone()).await)
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        product.name.clone_from(&input.name);
        product.description.clone_from(&input.description);
        product.price = input.price;
        product.stock = input.stock;
        product.category = input.category;
        product.team.clone_from(&input.team);
        product.image_url.clone_from(&input.image_url);
        product.featured = input.featured;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.products.remove(&id).is_none() {
            return Ok(false);
        }
        for item in &mut tables.items {
            if item.product_id == Some(id) {
                item.product_id = None;
            }
        }
        Ok(true)
    }

    async fn reduce_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        match tables.products.get_mut(&id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                product.updated_at = Utc::now();
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn create_user(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|(user, _)| &user.email == new_user.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let user = User {
            id: UserId::new(next_id(&mut tables.next_user)),
            name: new_user.name.to_owned(),
            email: new_user.email.clone(),
            role: new_user.role,
        };
        tables
            .users
            .insert(user.id, (user.clone(), new_user.password_hash.to_owned()));
        Ok(user)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(
        &self,
        user_id: UserId,
        request: &CreateOrderRequest,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.lock().await;

        // Check every reference before writing so a failure leaves no rows.
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user {user_id} does not exist"
            )));
        }
        if let Some(item) = request
            .items
            .iter()
            .find(|item| !tables.products.contains_key(&item.product_id))
        {
            return Err(RepositoryError::Conflict(format!(
                "product {} does not exist",
                item.product_id
            )));
        }

        let order = Order {
            id: OrderId::new(next_id(&mut tables.next_order)),
            user_id,
            total: request.total,
            shipping_address: request.shipping_address.clone(),
            status: OrderStatus::Confirmed,
            created_at: Utc::now(),
        };
        for item in &request.items {
            tables.items.push(StoredItem {
                order_id: order.id,
                product_id: Some(item.product_id),
                quantity: item.quantity,
                price: item.price,
            });
        }
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<&Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders.into_iter().map(|o| tables.with_items(o)).collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.get(&id).map(|o| tables.with_items(o)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<DateTime<Utc>, RepositoryError> {
        Ok(Utc::now())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use golazo_core::{OrderItemInput, Role};

    fn camiseta(stock: i32) -> ProductInput {
        ProductInput {
            name: "Camiseta Local".to_owned(),
            description: String::new(),
            price: Decimal::from(350_000),
            stock,
            category: Category::Camisetas,
            team: "Colombia".to_owned(),
            image_url: Some("/uploads/camiseta.png".to_owned()),
            featured: true,
        }
    }

    async fn user(store: &MemoryStore) -> User {
        let email = Email::parse("hincha@golazo.co").unwrap();
        store
            .create_user(NewUser {
                name: "Hincha",
                email: &email,
                password_hash: "hash",
                role: Role::User,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reduce_stock_never_goes_negative() {
        let store = MemoryStore::new();
        let product = store.insert_product(camiseta(3)).await;

        let reduced = store.reduce_stock(product.id, 2).await.unwrap().unwrap();
        assert_eq!(reduced.stock, 1);
        assert!(store.reduce_stock(product.id, 2).await.unwrap().is_none());
        assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        user(&store).await;
        let email = Email::parse("HINCHA@golazo.co").unwrap();
        let err = store
            .create_user(NewUser {
                name: "Otro",
                email: &email,
                password_hash: "hash",
                role: Role::User,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_order_with_unknown_product_writes_nothing() {
        let store = MemoryStore::new();
        let user = user(&store).await;
        let request = CreateOrderRequest {
            user_id: None,
            items: vec![OrderItemInput {
                product_id: ProductId::new(99),
                quantity: 1,
                price: Decimal::from(10),
            }],
            total: Decimal::from(10),
            shipping_address: "Cra 1".to_owned(),
        };
        assert!(store.create_order(user.id, &request).await.is_err());
        assert!(store.orders_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_keeps_order_line() {
        let store = MemoryStore::new();
        let user = user(&store).await;
        let product = store.insert_product(camiseta(5)).await;
        let request = CreateOrderRequest {
            user_id: None,
            items: vec![OrderItemInput {
                product_id: product.id,
                quantity: 2,
                price: product.price,
            }],
            total: product.price * Decimal::from(2),
            shipping_address: "Cra 1".to_owned(),
        };
        let order = store.create_order(user.id, &request).await.unwrap();
        assert!(store.delete_product(product.id).await.unwrap());

        let fetched = store.get_order(order.id).await.unwrap().unwrap();
        let line = &fetched.items[0];
        assert_eq!(line.product_id, None);
        assert_eq!(line.name, None);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, Decimal::from(350_000));
    }
}
