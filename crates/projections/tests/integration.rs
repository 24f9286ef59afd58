//! Integration tests: command service → message producer → listener → views.

use std::sync::Arc;

use command_api::{
    ChangeUserPassword, CreateCategory, DeleteCategory, MarkCategoryForDeletion, RegisterUser,
    VerifyUserEmail,
};
use command_server::{AuctionCommandHandler, CommandRouter, CommandService, MessageProducer};
use common::{AggregateId, MessageEnvelope};
use domain::{Aggregate, CategoryState, DEFAULT_MAX_RETRIES, Password, UserState};
use event_store::InMemoryEventStore;
use projections::{CategoriesView, MessageListener, ReadModel, UsersView};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

struct Setup {
    service: CommandService<InMemoryEventStore>,
    messages: UnboundedReceiver<MessageEnvelope>,
    listener: MessageListener,
    users: UsersView,
    categories: CategoriesView,
}

/// Helper to set up the command side, the listener and both views.
fn setup() -> Setup {
    setup_with_retries(DEFAULT_MAX_RETRIES)
}

fn setup_with_retries(max_retries: usize) -> Setup {
    let (producer, messages) = MessageProducer::channel();
    let handler = AuctionCommandHandler::builder(InMemoryEventStore::new())
        .publisher(Arc::new(producer))
        .max_retries(max_retries)
        .build();
    let service = CommandService::new(CommandRouter::auction(Arc::new(handler)));

    let users = UsersView::new();
    let categories = CategoriesView::new();
    let listener = MessageListener::new()
        .with(Arc::new(users.clone()))
        .with(Arc::new(categories.clone()));

    Setup {
        service,
        messages,
        listener,
        users,
        categories,
    }
}

/// Applies everything published so far and returns what was applied.
async fn deliver(setup: &mut Setup) -> Vec<MessageEnvelope> {
    let mut delivered = Vec::new();
    while let Ok(message) = setup.messages.try_recv() {
        setup.listener.dispatch(&message).await.unwrap();
        delivered.push(message);
    }
    delivered
}

async fn register_peter(setup: &Setup) -> Uuid {
    let registered = setup
        .service
        .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
        .await;
    registered.aggregate_id.as_deref().unwrap().parse().unwrap()
}

#[tokio::test]
async fn user_lifecycle_reaches_the_read_model() {
    let mut setup = setup();

    let registered = setup
        .service
        .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
        .await;
    let user_id: Uuid = registered.aggregate_id.as_deref().unwrap().parse().unwrap();

    // Not visible until the message is applied.
    assert!(setup.users.get_user(user_id).await.is_none());
    deliver(&mut setup).await;

    let row = setup.users.get_user(user_id).await.unwrap();
    assert_eq!(row.user_name, "peter");
    assert_eq!(row.state, UserState::New);
    assert_eq!(row.password_hash, Password::new("12345678").hash().as_str());

    setup
        .service
        .send(&ChangeUserPassword::new(user_id, "12345678", "abc123def"))
        .await;
    let token = setup
        .service
        .router()
        .handler()
        .users()
        .load(AggregateId::from_uuid(user_id))
        .await
        .unwrap()
        .verification_token()
        .unwrap()
        .clone();
    setup
        .service
        .send(&VerifyUserEmail::new(user_id, token.as_str()))
        .await;
    deliver(&mut setup).await;

    let row = setup.users.get_user(user_id).await.unwrap();
    assert_eq!(row.state, UserState::Active);
    assert_eq!(row.password_hash, Password::new("abc123def").hash().as_str());
}

#[tokio::test]
async fn rejected_commands_publish_nothing() {
    let mut setup = setup();

    setup
        .service
        .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
        .await;
    setup
        .service
        .send(&RegisterUser::new("peter", "12345678", "other@x.com"))
        .await;
    deliver(&mut setup).await;

    assert_eq!(ReadModel::count(&setup.users), 1);
}

#[tokio::test]
async fn category_lifecycle_reaches_the_read_model() {
    let mut setup = setup();

    let books = setup.service.send(&CreateCategory::new("Books")).await;
    let toys = setup.service.send(&CreateCategory::new("Toys")).await;
    let books: i64 = books.aggregate_id.as_deref().unwrap().parse().unwrap();
    let toys: i64 = toys.aggregate_id.as_deref().unwrap().parse().unwrap();

    setup
        .service
        .send(&MarkCategoryForDeletion::new(books))
        .await;
    setup.service.send(&DeleteCategory::new(books)).await;
    setup.service.send(&MarkCategoryForDeletion::new(toys)).await;
    deliver(&mut setup).await;

    let states: Vec<_> = setup
        .categories
        .get_all_categories()
        .await
        .into_iter()
        .map(|c| (c.name, c.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("Books".to_string(), CategoryState::Deleted),
            ("Toys".to_string(), CategoryState::MarkedForDeletion),
        ]
    );
}

#[tokio::test]
async fn listener_loop_drains_the_channel() {
    let Setup {
        service,
        messages,
        listener,
        categories,
        ..
    } = setup();

    service.send(&CreateCategory::new("Books")).await;
    service.send(&CreateCategory::new("Toys")).await;

    // Dropping the service closes the channel, which ends the loop.
    drop(service);
    listener.run(messages).await;

    assert_eq!(ReadModel::count(&categories), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commands_on_one_user_keep_the_read_model_in_step() {
    for _ in 0..20 {
        let mut setup = setup_with_retries(64);
        let user_id = register_peter(&setup).await;
        let users = setup.service.router().handler().users();
        let token = users
            .load(AggregateId::from_uuid(user_id))
            .await
            .unwrap()
            .verification_token()
            .unwrap()
            .clone();

        let mut tasks = Vec::new();
        for round in 0..8 {
            let service = setup.service.clone();
            tasks.push(tokio::spawn(async move {
                service
                    .send(&ChangeUserPassword::new(user_id, "12345678", "12345678"))
                    .await
            }));
            if round == 3 {
                let service = setup.service.clone();
                let token = token.as_str().to_string();
                tasks.push(tokio::spawn(async move {
                    service.send(&VerifyUserEmail::new(user_id, &token)).await
                }));
            }
        }
        for task in tasks {
            assert!(task.await.unwrap().is_success());
        }
        deliver(&mut setup).await;

        let user = setup
            .service
            .router()
            .handler()
            .users()
            .load(AggregateId::from_uuid(user_id))
            .await
            .unwrap();
        let row = setup.users.get_user(user_id).await.unwrap();
        assert_eq!(row.version, user.version().as_i64());
        assert_eq!(row.version, 10);
        assert_eq!(row.state, user.state());
        assert_eq!(row.state, UserState::Active);
        assert_eq!(row.password_hash, user.password_hash().unwrap().as_str());
    }
}

#[tokio::test]
async fn redelivery_after_later_changes_is_harmless() {
    let mut setup = setup();
    let user_id = register_peter(&setup).await;
    let books = setup.service.send(&CreateCategory::new("Books")).await;
    let books: i64 = books.aggregate_id.as_deref().unwrap().parse().unwrap();
    setup
        .service
        .send(&MarkCategoryForDeletion::new(books))
        .await;
    setup
        .service
        .send(&ChangeUserPassword::new(user_id, "12345678", "abc123def"))
        .await;
    let earlier = deliver(&mut setup).await;

    setup.service.send(&DeleteCategory::new(books)).await;
    setup
        .service
        .send(&ChangeUserPassword::new(user_id, "abc123def", "xyz98765"))
        .await;
    deliver(&mut setup).await;

    for message in &earlier {
        setup.listener.dispatch(message).await.unwrap();
    }

    assert_eq!(
        setup.categories.get_category(books).await.unwrap().state,
        CategoryState::Deleted
    );
    let row = setup.users.get_user(user_id).await.unwrap();
    assert_eq!(row.password_hash, Password::new("xyz98765").hash().as_str());
    assert_eq!(row.version, 3);
}
