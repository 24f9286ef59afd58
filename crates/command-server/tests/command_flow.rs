//! Commands driven through the gateway with the message producer attached.

use std::sync::Arc;

use command_api::{
    ChangeUserPassword, CommandEnvelope, CreateCategory, DeleteCategory, GetServerInfo,
    MarkCategoryForDeletion, RegisterUser, ResultCode, VerifyUserEmail,
};
use command_server::{
    AuctionCommandHandler, CommandRouter, CommandService, MessageProducer, VerificationMailer,
};
use common::{AggregateId, MessageEnvelope, UserCreatedMessage, UserPasswordChangedMessage};
use domain::{FanOutPublisher, Password};
use event_store::InMemoryEventStore;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

struct Harness {
    service: CommandService<InMemoryEventStore>,
    messages: UnboundedReceiver<MessageEnvelope>,
}

fn harness() -> Harness {
    let (producer, messages) = MessageProducer::channel();
    let publisher = FanOutPublisher::new()
        .with(Arc::new(producer))
        .with(Arc::new(VerificationMailer::new("noreply@auction.local")));

    let handler = AuctionCommandHandler::builder(InMemoryEventStore::new())
        .publisher(Arc::new(publisher))
        .build();
    let service = CommandService::new(CommandRouter::auction(Arc::new(handler)));

    Harness { service, messages }
}

fn drain(messages: &mut UnboundedReceiver<MessageEnvelope>) -> Vec<MessageEnvelope> {
    let mut drained = Vec::new();
    while let Ok(message) = messages.try_recv() {
        drained.push(message);
    }
    drained
}

mod user_registration {
    use super::*;

    #[tokio::test]
    async fn duplicate_checks_and_password_changes() {
        let Harness {
            service,
            mut messages,
        } = harness();

        let registered = service
            .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
            .await;
        assert!(registered.is_success());
        assert_eq!(registered.code, 104);
        let user_id: Uuid = registered.aggregate_id.as_deref().unwrap().parse().unwrap();

        let same = service
            .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
            .await;
        assert_eq!(same.code, 101);

        let other_email = service
            .send(&RegisterUser::new("peter", "12345678", "other@x.com"))
            .await;
        assert_eq!(other_email.code, 102);

        let other_name = service
            .send(&RegisterUser::new("someoneelse", "12345678", "peter@x.com"))
            .await;
        assert_eq!(other_name.code, 103);

        let changed = service
            .send(&ChangeUserPassword::new(user_id, "12345678", "abc123def"))
            .await;
        assert_eq!(changed.code, 106);

        let wrong = service
            .send(&ChangeUserPassword::new(user_id, "wrong", "zzz"))
            .await;
        assert_eq!(wrong.code, 105);
        assert!(!wrong.is_success());

        let published = drain(&mut messages);
        let types: Vec<_> = published.iter().map(|m| m.message_type.as_str()).collect();
        assert_eq!(types, vec!["UserCreated", "UserPasswordChanged"]);

        let created: UserCreatedMessage = published[0].decode().unwrap();
        assert_eq!(created.user_id, user_id);
        assert_eq!(created.email, "peter@x.com");

        let password: UserPasswordChangedMessage = published[1].decode().unwrap();
        assert_eq!(
            password.password_hash,
            Password::new("abc123def").hash().as_str()
        );
    }

    #[tokio::test]
    async fn verification_with_the_issued_token() {
        let Harness {
            service,
            mut messages,
        } = harness();

        let registered = service
            .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
            .await;
        let user_id: Uuid = registered.aggregate_id.as_deref().unwrap().parse().unwrap();

        let handler = service.router().handler();
        let token = handler
            .users()
            .load(AggregateId::from_uuid(user_id))
            .await
            .unwrap()
            .verification_token()
            .unwrap()
            .clone();

        let wrong = service
            .send(&VerifyUserEmail::new(user_id, "guess"))
            .await;
        assert_eq!(wrong.result_code(), Some(ResultCode::UserEmailVerificationFailed));

        let verified = service
            .send(&VerifyUserEmail::new(user_id, token.as_str()))
            .await;
        assert_eq!(verified.result_code(), Some(ResultCode::UserEmailVerified));

        let again = service
            .send(&VerifyUserEmail::new(user_id, token.as_str()))
            .await;
        assert_eq!(again.result_code(), Some(ResultCode::IllegalUserState));

        let types: Vec<_> = drain(&mut messages)
            .into_iter()
            .map(|m| m.message_type)
            .collect();
        assert_eq!(types, vec!["UserCreated", "UserEmailVerified"]);
    }

    #[tokio::test]
    async fn concurrent_registrations_admit_one_user() {
        let Harness { service, .. } = harness();

        let attempts = (0..16).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .send(&RegisterUser::new("peter", "12345678", format!("peter{i}@x.com")))
                    .await
            })
        });

        let mut successes = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            let result = attempt.await.unwrap();
            if result.is_success() {
                successes += 1;
            } else {
                assert_eq!(result.result_code(), Some(ResultCode::DuplicateUsername));
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn names_differing_only_in_case_cannot_both_register() {
        let Harness {
            service,
            mut messages,
        } = harness();

        let lower = service
            .send(&RegisterUser::new("peter", "12345678", "peter@x.com"))
            .await;
        let upper = service
            .send(&RegisterUser::new("Peter", "12345678", "other@x.com"))
            .await;

        assert!(lower.is_success());
        assert_eq!(upper.result_code(), Some(ResultCode::InvalidCommand));
        assert_eq!(drain(&mut messages).len(), 1);
    }
}

mod categories {
    use super::*;

    #[tokio::test]
    async fn full_lifecycle_publishes_every_step() {
        let Harness {
            service,
            mut messages,
        } = harness();

        let created = service.send(&CreateCategory::new("Books")).await;
        let category_id: i64 = created.aggregate_id.as_deref().unwrap().parse().unwrap();

        assert_eq!(
            service.send(&DeleteCategory::new(category_id)).await.code,
            118
        );
        assert_eq!(
            service
                .send(&MarkCategoryForDeletion::new(category_id))
                .await
                .code,
            114
        );
        assert_eq!(
            service.send(&DeleteCategory::new(category_id)).await.code,
            116
        );

        let types: Vec<_> = drain(&mut messages)
            .into_iter()
            .map(|m| m.message_type)
            .collect();
        assert_eq!(
            types,
            vec!["CategoryCreated", "CategoryMarkedForDeletion", "CategoryDeleted"]
        );
    }
}

mod gateway {
    use super::*;

    #[tokio::test]
    async fn raw_envelopes_from_the_wire() {
        let Harness { service, .. } = harness();

        let newer_version: CommandEnvelope = serde_json::from_value(json!({
            "type": "CreateCategory",
            "version": 2,
            "fields": { "name": "Toys", "description": "ignored" }
        }))
        .unwrap();
        assert_eq!(service.execute(newer_version).await.code, 113);

        let not_a_uuid: CommandEnvelope = serde_json::from_value(json!({
            "type": "VerifyUserEmail",
            "version": 1,
            "fields": { "userId": "42", "token": "abc" }
        }))
        .unwrap();
        assert_eq!(service.execute(not_a_uuid).await.code, 2);

        let unknown_user = service
            .send(&VerifyUserEmail::new(Uuid::new_v4(), "abc"))
            .await;
        assert_eq!(unknown_user.code, 3);
    }

    #[tokio::test]
    async fn server_info() {
        let Harness { service, .. } = harness();
        let result = service.send(&GetServerInfo::default()).await;

        assert!(result.is_success());
        assert_eq!(result.code, 100);
        let info = result.server_info.unwrap();
        assert_eq!(info.name, command_server::SERVER_NAME);
        assert!(!info.version.is_empty());
    }
}
