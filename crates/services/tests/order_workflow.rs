//! Integration tests for the order workflow over the in-memory store.

use common::{OrderId, ProductId, UserId};
use domain::{
    Actor, LineRequest, MAX_LINE_QUANTITY, Money, NewCategory, NewProduct, NewReport, NewUser,
    OrderState, PaymentType, ReportChanges, ReportType, Role,
};
use services::{
    CatalogService, CreateOrder, ErrorKind, OrderService, ReportService, ServiceError,
    UserService,
};
use store::{CatalogStore, InMemoryStore, OrderFilter, OrderStore};

const ADMIN: Actor = Actor {
    user_id: UserId::new(1),
    role: Role::Admin,
};

struct TestHarness {
    store: InMemoryStore,
    orders: OrderService<InMemoryStore>,
    catalog: CatalogService<InMemoryStore>,
    users: UserService<InMemoryStore>,
    reports: ReportService<InMemoryStore>,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryStore::new();
        Self {
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            users: UserService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            store,
        }
    }

    async fn category(&self) -> common::CategoryId {
        self.catalog
            .create_category(
                ADMIN,
                NewCategory {
                    name: "Bakery".to_string(),
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn customer(&self, email: &str) -> Actor {
        let user = self
            .users
            .create_user(
                ADMIN,
                NewUser {
                    name: "Ana Torres".to_string(),
                    email: email.to_string(),
                    password: "secret1".to_string(),
                    role: Role::Customer,
                },
            )
            .await
            .unwrap();
        Actor::new(user.id, user.role)
    }

    async fn product(&self, price_cents: i64, stock: Option<u32>) -> ProductId {
        let category_id = self.category().await;
        self.catalog
            .create_product(
                ADMIN,
                NewProduct {
                    category_id,
                    name: "Croissant".to_string(),
                    description: None,
                    price: Money::from_cents(price_cents),
                    stock,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn stock(&self, id: ProductId) -> Option<u32> {
        self.store.get_product(id).await.unwrap().unwrap().stock
    }

    async fn place(&self, actor: Actor, lines: &[(ProductId, u32)]) -> Result<OrderId, ServiceError> {
        let lines = lines
            .iter()
            .map(|(id, qty)| LineRequest::new(*id, *qty))
            .collect();
        self.orders
            .create_order(actor, CreateOrder::new(actor.user_id, PaymentType::Cash, lines))
            .await
            .map(|order| order.id())
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn create_cancel_then_process_scenario() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(450, Some(10)).await;

        let order = h
            .orders
            .create_order(
                customer,
                CreateOrder::new(
                    customer.user_id,
                    PaymentType::Cash,
                    vec![LineRequest::new(product, 2)],
                ),
            )
            .await
            .unwrap();
        assert_eq!(order.total(), Money::from_cents(900));
        assert_eq!(order.state(), OrderState::Pending);
        assert_eq!(h.stock(product).await, Some(8));

        let cancelled = h.orders.cancel_order(customer, order.id()).await.unwrap();
        assert_eq!(cancelled.state(), OrderState::Cancelled);
        assert_eq!(h.stock(product).await, Some(10));

        let err = h
            .orders
            .change_state(ADMIN, order.id(), OrderState::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(h.stock(product).await, Some(10));
    }

    #[tokio::test]
    async fn create_scenario_from_decimal_wire_body() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let category_id = h.category().await;

        let product: NewProduct = serde_json::from_value(serde_json::json!({
            "categoryId": category_id,
            "name": "Croissant",
            "price": 4.50,
            "stock": 10,
        }))
        .unwrap();
        let product = h.catalog.create_product(ADMIN, product).await.unwrap();
        assert_eq!(product.price, Money::from_cents(450));

        let request: CreateOrder = serde_json::from_value(serde_json::json!({
            "userId": customer.user_id,
            "paymentType": "EFECTIVO",
            "lines": [{"productId": product.id, "quantity": 2}],
        }))
        .unwrap();
        let order = h.orders.create_order(customer, request).await.unwrap();

        assert_eq!(order.total(), Money::from_cents(900));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total"], 9.0);
        assert_eq!(json["line_items"][0]["unit_price"], 4.5);
        assert_eq!(h.stock(product.id).await, Some(8));
    }

    #[tokio::test]
    async fn half_cent_prices_round_half_up() {
        let h = TestHarness::new();
        let category_id = h.category().await;

        let product: NewProduct = serde_json::from_value(serde_json::json!({
            "category_id": category_id,
            "name": "Macaron",
            "price": 4.505,
        }))
        .unwrap();
        let product = h.catalog.create_product(ADMIN, product).await.unwrap();
        assert_eq!(product.price, Money::from_cents(451));
    }

    #[tokio::test]
    async fn overflowing_amounts_are_rejected_not_wrapped() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let category_id = h.category().await;

        let too_expensive = h
            .catalog
            .create_product(
                ADMIN,
                NewProduct {
                    category_id,
                    name: "Gold bar".to_string(),
                    description: None,
                    price: Money::from_cents(3_000_000_000),
                    stock: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(too_expensive.kind(), ErrorKind::Validation);

        // A legacy row priced above the limit must still never wrap.
        let legacy = h
            .store
            .insert_product(NewProduct {
                category_id,
                name: "Legacy".to_string(),
                description: None,
                price: Money::from_cents(i64::MAX / 2),
                stock: None,
            })
            .await
            .unwrap();
        let err = h.place(customer, &[(legacy.id, 3)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(h.store.list_orders(OrderFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_quantities_are_rejected() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let a = h.product(100, None).await;
        let b = h.product(100, None).await;

        let err = h
            .place(customer, &[(a, 3_000_000_000), (b, 3_000_000_000)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(h.store.list_orders(OrderFilter::new()).await.unwrap().is_empty());

        let order_id = h
            .place(customer, &[(a, MAX_LINE_QUANTITY), (b, MAX_LINE_QUANTITY)])
            .await
            .unwrap();
        let order = h.orders.get_order(customer, order_id).await.unwrap();
        assert_eq!(order.total_quantity(), 2 * u64::from(MAX_LINE_QUANTITY));
    }

    #[tokio::test]
    async fn staff_drives_fulfillment_without_touching_stock() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(450, Some(10)).await;
        let order_id = h.place(customer, &[(product, 3)]).await.unwrap();

        for target in [
            OrderState::Processing,
            OrderState::Completed,
            OrderState::Delivered,
        ] {
            let order = h.orders.change_state(ADMIN, order_id, target).await.unwrap();
            assert_eq!(order.state(), target);
            assert_eq!(h.stock(product).await, Some(7));
        }

        let err = h
            .orders
            .change_state(ADMIN, order_id, OrderState::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn cancel_via_change_state_releases_stock() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(5)).await;
        let order_id = h.place(customer, &[(product, 5)]).await.unwrap();
        assert_eq!(h.stock(product).await, Some(0));

        let order = h
            .orders
            .change_state(ADMIN, order_id, OrderState::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.state(), OrderState::Cancelled);
        assert_eq!(h.stock(product).await, Some(5));
    }

    #[tokio::test]
    async fn processing_orders_cannot_be_cancelled() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(5)).await;
        let order_id = h.place(customer, &[(product, 1)]).await.unwrap();
        h.orders
            .change_state(ADMIN, order_id, OrderState::Processing)
            .await
            .unwrap();

        let err = h.orders.cancel_order(ADMIN, order_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(h.stock(product).await, Some(4));
    }

    #[tokio::test]
    async fn price_changes_never_reach_placed_orders() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product_id = h.product(450, None).await;
        let order_id = h.place(customer, &[(product_id, 2)]).await.unwrap();

        let product = h.store.get_product(product_id).await.unwrap().unwrap();
        h.catalog
            .update_product(
                ADMIN,
                product_id,
                domain::ProductChanges {
                    category_id: product.category_id,
                    name: product.name,
                    description: None,
                    price: Money::from_cents(999),
                    stock: None,
                    active: true,
                },
            )
            .await
            .unwrap();

        let order = h.orders.get_order(customer, order_id).await.unwrap();
        assert_eq!(order.total(), Money::from_cents(900));
        assert_eq!(order.line_items()[0].unit_price(), Money::from_cents(450));
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn duplicate_lines_are_merged() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;

        let order_id = h.place(customer, &[(product, 2), (product, 3)]).await.unwrap();
        let order = h.orders.get_order(customer, order_id).await.unwrap();

        assert_eq!(order.line_items().len(), 1);
        assert_eq!(order.line_items()[0].quantity(), 5);
        assert_eq!(h.stock(product).await, Some(5));
    }

    #[tokio::test]
    async fn insufficient_stock_reports_shortfall_and_rolls_back() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let plenty = h.product(100, Some(10)).await;
        let scarce = h.product(100, Some(2)).await;

        let err = h
            .place(customer, &[(plenty, 4), (scarce, 3)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(h.stock(plenty).await, Some(10));
        assert_eq!(h.stock(scarce).await, Some(2));
    }

    #[tokio::test]
    async fn persistence_failure_leaves_stock_untouched() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;

        h.store.fail_next_write();
        let err = h.place(customer, &[(product, 4)]).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(h.stock(product).await, Some(10));
    }

    #[tokio::test]
    async fn validation_errors_are_not_retryable() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;

        let empty = h.place(customer, &[]).await.unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::Validation);
        assert!(!empty.is_retryable());

        let zero = h.place(customer, &[(product, 0)]).await.unwrap_err();
        assert_eq!(zero.kind(), ErrorKind::Validation);

        let missing = h.place(customer, &[(ProductId::new(99), 1)]).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn inactive_products_are_rejected() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;
        h.catalog.deactivate_product(ADMIN, product).await.unwrap();

        let err = h.place(customer, &[(product, 1)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inactive);
        assert_eq!(h.stock(product).await, Some(10));
    }

    #[tokio::test]
    async fn orders_need_an_active_user() {
        let h = TestHarness::new();
        let product = h.product(100, None).await;

        let ghost = h.place(ADMIN, &[(product, 1)]).await.unwrap_err();
        assert_eq!(ghost.kind(), ErrorKind::NotFound);

        let customer = h.customer("ana@example.com").await;
        h.users.deactivate_user(ADMIN, customer.user_id).await.unwrap();
        let inactive = h.place(customer, &[(product, 1)]).await.unwrap_err();
        assert_eq!(inactive.kind(), ErrorKind::Inactive);
    }

    #[tokio::test]
    async fn untracked_stock_is_unlimited() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, None).await;

        h.place(customer, &[(product, 10_000)]).await.unwrap();
        assert_eq!(h.stock(product).await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_orders_never_oversell() {
        const N: u32 = 12;

        let h = std::sync::Arc::new(TestHarness::new());
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(N - 1)).await;

        let tasks: Vec<_> = (0..N)
            .map(|_| {
                let h = h.clone();
                tokio::spawn(async move { h.place(customer, &[(product, 1)]).await })
            })
            .collect();
        let results = futures_util::future::join_all(tasks).await;

        let placed = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let rejected: Vec<_> = results
            .into_iter()
            .filter_map(|r| r.unwrap().err())
            .collect();

        assert_eq!(placed, (N - 1) as usize);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].kind(), ErrorKind::InsufficientStock);
        assert_eq!(h.stock(product).await, Some(0));
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn one_conflict_is_retried_transparently() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;
        let order_id = h.place(customer, &[(product, 2)]).await.unwrap();

        h.store.conflict_next_state_changes(1);
        let order = h.orders.cancel_order(customer, order_id).await.unwrap();

        assert_eq!(order.state(), OrderState::Cancelled);
        assert_eq!(h.stock(product).await, Some(10));
    }

    #[tokio::test]
    async fn repeated_conflicts_surface_as_retryable() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;
        let order_id = h.place(customer, &[(product, 2)]).await.unwrap();

        h.store.conflict_next_state_changes(2);
        let err = h
            .orders
            .change_state(ADMIN, order_id, OrderState::Processing)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
        assert!(err.is_retryable());
        let order = h.orders.get_order(ADMIN, order_id).await.unwrap();
        assert_eq!(order.state(), OrderState::Pending);
    }

    #[tokio::test]
    async fn failed_cancellation_keeps_reservation() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(10)).await;
        let order_id = h.place(customer, &[(product, 2)]).await.unwrap();

        h.store.fail_next_write();
        let err = h.orders.cancel_order(customer, order_id).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(h.stock(product).await, Some(8));
        let order = h.orders.get_order(customer, order_id).await.unwrap();
        assert_eq!(order.state(), OrderState::Pending);
    }
}

mod roles {
    use super::*;

    #[tokio::test]
    async fn customers_order_only_for_themselves() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let bob = h.customer("bob@example.com").await;
        let product = h.product(100, None).await;

        let err = h
            .orders
            .create_order(
                ana,
                CreateOrder::new(
                    bob.user_id,
                    PaymentType::Card,
                    vec![LineRequest::new(product, 1)],
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let employee = Actor::new(UserId::new(99), Role::Employee);
        let order = h
            .orders
            .create_order(
                employee,
                CreateOrder::new(
                    bob.user_id,
                    PaymentType::Card,
                    vec![LineRequest::new(product, 1)],
                ),
            )
            .await
            .unwrap();
        assert_eq!(order.user_id(), bob.user_id);
    }

    #[tokio::test]
    async fn customers_cannot_drive_fulfillment() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let product = h.product(100, Some(3)).await;
        let order_id = h.place(customer, &[(product, 1)]).await.unwrap();

        let err = h
            .orders
            .change_state(customer, order_id, OrderState::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn customers_cancel_and_view_only_their_own_orders() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let bob = h.customer("bob@example.com").await;
        let product = h.product(100, Some(3)).await;
        let order_id = h.place(ana, &[(product, 1)]).await.unwrap();

        let view = h.orders.get_order(bob, order_id).await.unwrap_err();
        assert_eq!(view.kind(), ErrorKind::Forbidden);

        let cancel = h.orders.cancel_order(bob, order_id).await.unwrap_err();
        assert_eq!(cancel.kind(), ErrorKind::Forbidden);
        assert_eq!(h.stock(product).await, Some(2));

        h.orders.cancel_order(ana, order_id).await.unwrap();
        assert_eq!(h.stock(product).await, Some(3));
    }

    #[tokio::test]
    async fn catalog_and_users_require_capabilities() {
        let h = TestHarness::new();
        let customer = h.customer("ana@example.com").await;
        let employee = Actor::new(UserId::new(50), Role::Employee);

        let catalog = h
            .catalog
            .create_category(
                customer,
                NewCategory {
                    name: "Snacks".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(catalog.kind(), ErrorKind::Forbidden);

        h.catalog
            .create_category(
                employee,
                NewCategory {
                    name: "Snacks".to_string(),
                },
            )
            .await
            .unwrap();

        let users = h
            .users
            .deactivate_user(employee, customer.user_id)
            .await
            .unwrap_err();
        assert_eq!(users.kind(), ErrorKind::Forbidden);
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn category_with_active_products_is_a_conflict() {
        let h = TestHarness::new();
        let product = h.product(100, None).await;
        let category_id = h.store.get_product(product).await.unwrap().unwrap().category_id;

        let err = h
            .catalog
            .deactivate_category(ADMIN, category_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        h.catalog.deactivate_product(ADMIN, product).await.unwrap();
        let category = h
            .catalog
            .deactivate_category(ADMIN, category_id)
            .await
            .unwrap();
        assert!(!category.active);
    }

    #[tokio::test]
    async fn invalid_catalog_input_is_validation() {
        let h = TestHarness::new();
        let err = h
            .catalog
            .create_category(
                ADMIN,
                NewCategory {
                    name: " ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let h = TestHarness::new();
        h.customer("ana@example.com").await;

        let err = h
            .users
            .create_user(
                ADMIN,
                NewUser {
                    name: "Ana Again".to_string(),
                    email: "ANA@example.com".to_string(),
                    password: "secret1".to_string(),
                    role: Role::Customer,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

mod reports {
    use super::*;

    fn complaint(user: Actor, order_id: Option<OrderId>) -> NewReport {
        NewReport {
            user_id: user.user_id,
            order_id,
            title: "Late delivery".to_string(),
            description: Some("Arrived two days late".to_string()),
            report_type: Some(ReportType::Complaint),
        }
    }

    #[tokio::test]
    async fn customers_file_reports_about_their_orders() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let product = h.product(100, None).await;
        let order_id = h.place(ana, &[(product, 1)]).await.unwrap();

        let report = h
            .reports
            .create_report(ana, complaint(ana, Some(order_id)))
            .await
            .unwrap();
        assert!(report.active);
        assert_eq!(report.order_id, Some(order_id));

        let seen_by_staff = h.reports.get_report(ADMIN, report.id).await.unwrap();
        assert_eq!(seen_by_staff, report);
    }

    #[tokio::test]
    async fn reports_stay_private_to_their_owner() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let bob = h.customer("bob@example.com").await;
        let report = h.reports.create_report(ana, complaint(ana, None)).await.unwrap();

        let filed_for_other = h
            .reports
            .create_report(bob, complaint(ana, None))
            .await
            .unwrap_err();
        assert_eq!(filed_for_other.kind(), ErrorKind::Forbidden);

        let view = h.reports.get_report(bob, report.id).await.unwrap_err();
        assert_eq!(view.kind(), ErrorKind::Forbidden);

        let withdraw = h.reports.deactivate_report(bob, report.id).await.unwrap_err();
        assert_eq!(withdraw.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn reports_only_reference_the_owners_orders() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let bob = h.customer("bob@example.com").await;
        let product = h.product(100, None).await;
        let bobs_order = h.place(bob, &[(product, 1)]).await.unwrap();

        let foreign = h
            .reports
            .create_report(ana, complaint(ana, Some(bobs_order)))
            .await
            .unwrap_err();
        assert_eq!(foreign.kind(), ErrorKind::Validation);

        let missing = h
            .reports
            .create_report(ana, complaint(ana, Some(OrderId::new(404))))
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn withdrawn_reports_cannot_be_edited() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;
        let report = h.reports.create_report(ana, complaint(ana, None)).await.unwrap();

        let changes = ReportChanges {
            title: "Very late delivery".to_string(),
            description: None,
            report_type: Some(ReportType::Claim),
        };
        let edited = h
            .reports
            .update_report(ana, report.id, changes.clone())
            .await
            .unwrap();
        assert_eq!(edited.title, "Very late delivery");
        assert_eq!(edited.description, None);

        let withdrawn = h.reports.deactivate_report(ana, report.id).await.unwrap();
        assert!(!withdrawn.active);

        let err = h
            .reports
            .update_report(ADMIN, report.id, changes)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inactive);
    }

    #[tokio::test]
    async fn invalid_report_input_is_validation() {
        let h = TestHarness::new();
        let ana = h.customer("ana@example.com").await;

        let mut input = complaint(ana, None);
        input.title = "  ".to_string();
        let err = h.reports.create_report(ana, input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let ghost = Actor::new(UserId::new(404), Role::Customer);
        let err = h
            .reports
            .create_report(ghost, complaint(ghost, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
