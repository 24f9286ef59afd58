use std::sync::Arc;

use common::{CategoryCreatedMessage, MessageEnvelope, UserCreatedMessage};
use criterion::{Criterion, criterion_group, criterion_main};
use projections::{CategoriesView, MessageListener, Projection, UsersView};
use uuid::Uuid;

fn user_messages(n: usize) -> Vec<MessageEnvelope> {
    (0..n)
        .map(|i| {
            MessageEnvelope::wrap(
                &UserCreatedMessage {
                    user_id: Uuid::new_v4(),
                    user_name: format!("user{i}"),
                    email: format!("user{i}@x.com"),
                    password_hash: "hash".to_string(),
                },
                1,
            )
            .unwrap()
        })
        .collect()
}

fn category_messages(n: usize) -> Vec<MessageEnvelope> {
    (0..n)
        .map(|i| {
            MessageEnvelope::wrap(
                &CategoryCreatedMessage {
                    category_id: i as i64 + 1,
                    name: format!("category{i}"),
                },
                1,
            )
            .unwrap()
        })
        .collect()
}

fn bench_users_view(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let messages = user_messages(300);

    c.bench_function("projections/users_300_created", |b| {
        b.iter(|| {
            rt.block_on(async {
                let view = UsersView::new();
                for message in &messages {
                    view.handle(message).await.unwrap();
                }
            });
        });
    });
}

fn bench_listener_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut messages = user_messages(150);
    messages.extend(category_messages(150));

    c.bench_function("projections/listener_dispatch_300", |b| {
        b.iter(|| {
            rt.block_on(async {
                let listener = MessageListener::new()
                    .with(Arc::new(UsersView::new()))
                    .with(Arc::new(CategoriesView::new()));
                for message in &messages {
                    listener.dispatch(message).await.unwrap();
                }
            });
        });
    });
}

criterion_group!(benches, bench_users_view, bench_listener_dispatch);
criterion_main!(benches);
